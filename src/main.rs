use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use stratum::history::{History, Traversal};
use stratum::{blame, cli, config, filters, git, lang, models, reporter, scanner};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    match cli.command {
        cli::Commands::Todos(args) => todos_command(args)?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn todos_command(args: cli::TodosArgs) -> Result<()> {
    init_logging(args.verbose);

    // Load configuration; flags win over the config file
    let mut config =
        config::load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(timeout) = args.timeout.clone() {
        config.timeout = timeout;
    }
    if args.stop_after.is_some() {
        config.stop_after = args.stop_after;
    }
    if args.first_parent {
        config.traversal = Traversal::FirstParent;
    }
    let timeout = config::blame_timeout(&config)?;
    let mut tables = lang::LanguageTables::new(&config.languages)
        .context("Invalid comment boundaries in configuration")?;

    let root = args
        .path
        .canonicalize()
        .with_context(|| format!("Cannot access {}", args.path.display()))?;
    info!(path = %root.display(), marker = %config.marker, "scanning");

    let history = if args.no_blame {
        None
    } else {
        git::GitHistory::discover(&root, config.traversal).context("Failed to open git repository")?
    };

    // Item paths must be relative to the work dir to match diff paths
    let base = history
        .as_ref()
        .and_then(|h| h.workdir())
        .and_then(|w| w.canonicalize().ok())
        .unwrap_or_else(|| root.clone());

    let mut items = scanner::scan_directory(&root, &base, &config, &mut tables)
        .context("Failed to scan directory")?;
    info!(count = items.len(), "found TODOs");

    match history.as_ref() {
        Some(history) => blame_items(&mut items, history, &config, timeout)?,
        None => info!("No git repository found, skipping blame data"),
    }

    if let Some(ref older_than) = args.older_than {
        items = filters::filter_by_age(items, older_than, Utc::now())
            .context("Failed to filter by age")?;
    }

    if let Some(ref author) = args.author {
        items = filters::filter_by_author(items, author);
    }

    let report = models::TodoReport::new(items, args.path.clone());
    reporter::generate_report(&report, args.format, args.output.as_deref())
        .context("Failed to generate report")?;

    Ok(())
}

fn blame_items(
    items: &mut [models::Item],
    history: &git::GitHistory,
    config: &models::Config,
    timeout: std::time::Duration,
) -> Result<()> {
    let head = match history.head() {
        Ok(head) => head,
        Err(err) if err.is_unborn() => {
            warn!(%err, "Repository has no commits, skipping blame data");
            return Ok(());
        }
        Err(err) => return Err(err).context("Failed to read HEAD commit"),
    };

    let cancel = blame::CancelToken::with_timeout(timeout);
    let trip = cancel.clone();
    let total = items.len();
    let stop_after = config.stop_after;

    let mut progress = |commit: &models::CommitRef, remaining: usize| {
        let resolved = total - remaining;
        debug!(
            commit = %commit.short_id(),
            authored = %commit.author_time,
            "({}/{}) resolved",
            resolved,
            total
        );
        if stop_after.is_some_and(|limit| resolved >= limit) {
            trip.cancel();
        }
    };

    let summary = blame::resolve(items, history, &head, &cancel, Some(&mut progress))
        .context("Failed to find TODO origins")?;

    if summary.cancelled {
        info!(
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            "stopped walking history early"
        );
    } else {
        info!(
            steps = summary.steps,
            resolved = summary.resolved,
            unresolved = summary.unresolved,
            "history walk finished"
        );
    }

    Ok(())
}
