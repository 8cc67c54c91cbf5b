use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context as _, Result};
use clap::{CommandFactory as _, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use partial::config::CONFIG_PATH;
use partial::{
    ConfigError, Configuration, Overrides, PartialConfig, PartialError, PlanReport, Selection,
    plan, reactor, telemetry,
};
use partial_git::{GitRepo as _, GixRepo};

/// Select the modules of a multi-module project that need rebuilding.
///
/// Changed files are detected with git (working tree, base branch, merge
/// base, or a freshly fetched reference branch), mapped to the modules that
/// own them, and expanded through the module graph.
///
/// EXAMPLES:
///
///   # Modules touched by local edits, plus everything depending on them
///   partial --uncommitted --untracked
///
///   # Modules changed on this branch since it forked from develop
///   partial --base-branch develop --compare-to-merge-base
///
///   # Compare against the latest origin/develop
///   partial --fetch-reference-branch --reference-branch refs/remotes/origin/develop
///
/// The build set goes to stdout, one module id per line. Logs go to stderr
/// (RUST_LOG, PARTIAL_LOG_FORMAT=json).
#[derive(Parser)]
#[command(name = "partial")]
#[command(version, about)]
#[command(propagate_version = true)]
#[command(after_help = "See 'partial <command> --help' for more information on a specific command.")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    args: SelectArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the modules to build, in reactor order (default)
    #[command(visible_alias = "plan")]
    BuildSet,

    /// Print the changed files only, without consulting the reactor
    Changes,

    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One entry per line
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(clap::Args)]
struct SelectArgs {
    /// Config file [default: <repo>/.partial/config.toml]
    #[arg(long, global = true, env = "PARTIAL_CONFIG")]
    config: Option<PathBuf>,

    /// Reactor manifest, relative to the repository root
    #[arg(long, global = true, env = "PARTIAL_REACTOR")]
    reactor: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t)]
    format: Format,

    /// Write the result to a file instead of stdout
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Consider tracked files with staged or unstaged changes
    #[arg(long, global = true)]
    uncommitted: bool,

    /// Consider files unknown to git
    #[arg(long, global = true)]
    untracked: bool,

    /// Compare HEAD against this branch (checked out first unless
    /// --compare-to-merge-base is given)
    #[arg(long, global = true, env = "PARTIAL_BASE_BRANCH")]
    base_branch: Option<String>,

    /// Compare against the merge base of HEAD and the base
    #[arg(long, global = true)]
    compare_to_merge_base: bool,

    /// Fetch --reference-branch before comparing against it
    #[arg(long, global = true)]
    fetch_reference_branch: bool,

    /// Remote-tracking ref to fetch, e.g. refs/remotes/origin/develop
    #[arg(long, global = true, env = "PARTIAL_REFERENCE_BRANCH")]
    reference_branch: Option<String>,

    /// Remote used when --reference-branch names a bare branch
    #[arg(long, global = true, env = "PARTIAL_REMOTE")]
    remote: Option<String>,

    /// Ignore changed files matching this glob (repeatable)
    #[arg(long = "exclude", global = true, value_name = "GLOB")]
    exclude_paths: Vec<String>,

    /// Also build modules depending on changed modules
    #[arg(long, global = true, overrides_with = "no_impacted")]
    impacted: bool,

    /// Build only the changed modules themselves
    #[arg(long, global = true, overrides_with = "impacted")]
    no_impacted: bool,

    /// Also build snapshot dependencies of selected modules
    #[arg(long, global = true)]
    build_snapshot_dependencies: bool,

    /// Never build this module (repeatable, or comma separated)
    #[arg(
        long = "ignore",
        global = true,
        value_name = "ID",
        value_delimiter = ',',
        env = "PARTIAL_IGNORED_MODULES"
    )]
    ignored_modules: Vec<String>,

    /// Skip change detection and build every module
    #[arg(long, global = true)]
    build_all: bool,
}

impl SelectArgs {
    fn overrides(&self) -> Overrides {
        let impacted = if self.impacted {
            Some(true)
        } else if self.no_impacted {
            Some(false)
        } else {
            None
        };
        Overrides {
            uncommitted: self.uncommitted,
            untracked: self.untracked,
            base_branch: self.base_branch.clone(),
            compare_to_merge_base: self.compare_to_merge_base,
            fetch_reference_branch: self.fetch_reference_branch,
            reference_branch: self.reference_branch.clone(),
            remote: self.remote.clone(),
            exclude_paths: self.exclude_paths.clone(),
            impacted,
            build_snapshot_dependencies: self.build_snapshot_dependencies,
            ignored_modules: self.ignored_modules.clone(),
            build_all: self.build_all,
            reactor_manifest: self.reactor.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init("info");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let text = match cli.command.unwrap_or(Commands::BuildSet) {
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "partial", &mut io::stdout());
            return Ok(());
        }
        Commands::Changes => {
            let (repo, config) = open(&cli.args)?;
            let Selection::Changes(mode) = &config.selection else {
                return Err(PartialError::Config(ConfigError {
                    path: None,
                    message: "--build-all bypasses change detection; nothing to list".to_owned(),
                })
                .into());
            };
            let files = plan::changed_files(&repo, mode, &config).map_err(PartialError::from)?;
            let paths: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
            render(cli.args.format, &paths, || paths.clone())?
        }
        Commands::BuildSet => {
            let (repo, config) = open(&cli.args)?;
            let manifest = repo.workdir().join(&config.reactor_manifest);
            let graph = reactor::load(&manifest).map_err(PartialError::from)?;
            let plan = plan::plan(&repo, &graph, &config).map_err(PartialError::from)?;
            let report = PlanReport::from(&plan);
            render(cli.args.format, &report, || report.build_set.clone())?
        }
    };

    emit(&text, cli.args.output.as_deref())
}

/// Locate the repository from the current directory and resolve the
/// configuration for it.
fn open(args: &SelectArgs) -> Result<(GixRepo, Configuration)> {
    let cwd = std::env::current_dir().context("could not read the current directory")?;
    let repo = GixRepo::discover(&cwd).map_err(PartialError::Repository)?;
    let config = load_config(repo.workdir(), &cwd, args)?;
    Ok((repo, config))
}

/// File config, then command-line overrides, validated once.
fn load_config(root: &Path, cwd: &Path, args: &SelectArgs) -> Result<Configuration, PartialError> {
    let path = args
        .config
        .as_ref()
        .map_or_else(|| root.join(CONFIG_PATH), |p| cwd.join(p));
    let config = PartialConfig::load(&path)?
        .with_overrides(&args.overrides())
        .resolve()?;
    Ok(config)
}

fn render<T: serde::Serialize>(
    format: Format,
    value: &T,
    lines: impl FnOnce() -> Vec<String>,
) -> Result<String> {
    match format {
        Format::Json => {
            let mut json =
                serde_json::to_string_pretty(value).context("JSON serialization failed")?;
            json.push('\n');
            Ok(json)
        }
        Format::Text => Ok(lines().into_iter().map(|l| l + "\n").collect()),
    }
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, text).map_err(|source| PartialError::Output {
            path: path.to_owned(),
            source,
        })?;
        tracing::info!(path = %path.display(), "wrote result");
        return Ok(());
    }
    let mut stdout = io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
