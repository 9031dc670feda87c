pub(crate) mod executor;
pub(crate) mod files;
pub(crate) mod inventory;
pub(crate) mod retention;


use anyhow::{Context, Result};
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::logging;
use crate::paths::resolve_config_path;
use crate::sickbeard::{LibraryApi, SickBeardClient};

use self::executor::{DryRunExecutor, Effect, Executor, LiveExecutor};
use self::files::{FileStore, LocalFiles};
use self::inventory::{EpisodeRef, classify};
use self::retention::{DeletionPlan, RetentionPolicy, plan};

pub fn run(cli: Cli) -> Result<()> {
    logging::init(cli.debug)?;

    let Some(show_id) = cli.show_id() else {
        info!("No TV ID specified");
        return Ok(());
    };
    log_hook_arguments(&cli);

    let config = load_config(&cli).inspect_err(|err| error!("{err:#}"))?;
    let client = SickBeardClient::new(&config.server);

    let outcome = if cli.debug {
        process_show(&config, show_id, &client, &LocalFiles, &mut DryRunExecutor)
    } else {
        let mut executor = LiveExecutor::new(&client, &LocalFiles);
        process_show(&config, show_id, &client, &LocalFiles, &mut executor)
    };

    match outcome {
        Outcome::Done(report) => info!("Show {show_id}: {}", report.summary()),
        Outcome::Aborted(reason) => info!("{reason}"),
    }
    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let path = resolve_config_path(cli.config.as_deref())?;
    debug!("using config {}", path.display());
    Config::load(&path).with_context(|| format!("unusable configuration {}", path.display()))
}

fn log_hook_arguments(cli: &Cli) {
    if let Some(full_path) = cli.full_path.as_deref() {
        debug!("hook file: {full_path}");
    }
    if let Some(original_name) = cli.original_name.as_deref() {
        debug!("hook original name: {original_name}");
    }
    if let (Some(season), Some(episode)) = (cli.season.as_deref(), cli.episode.as_deref()) {
        debug!("hook episode: S{season}E{episode}");
    }
    // Informational only: retention ordering never looks at air dates.
    if let Some(raw) = cli.air_date.as_deref() {
        match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
            Ok(date) => debug!("hook air date: {date}"),
            Err(_) => debug!("hook air date (unparsed): {raw}"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum AbortReason {
    #[error("Unconfigured show {0}")]
    NotConfigured(String),

    #[error("Can't find show with tvdbid: {show_id} ({detail})")]
    InventoryUnavailable { show_id: String, detail: String },
}

#[derive(Debug)]
pub(crate) enum Outcome {
    Done(RunReport),
    Aborted(AbortReason),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RunReport {
    pub(crate) plan: DeletionPlan,
    /// Episodes whose file could not be located; nothing was done for them.
    pub(crate) skipped: Vec<EpisodeRef>,
    pub(crate) files_deleted: usize,
    pub(crate) file_failures: usize,
    pub(crate) status_failures: usize,
    /// Only set when the refresh was actually sent.
    pub(crate) refreshed: bool,
    /// Deletes, status updates and refreshes a dry run logged instead of doing.
    pub(crate) simulated: usize,
}

impl RunReport {
    pub(crate) fn summary(&self) -> String {
        let summary = format!(
            "retired {} of {} planned episodes ({} archived, {} downloaded), {} files deleted, \
             {} skipped, {} file failures, {} status failures, refreshed={}",
            self.plan.len() - self.skipped.len(),
            self.plan.len(),
            self.plan.archived.len(),
            self.plan.downloaded.len(),
            self.files_deleted,
            self.skipped.len(),
            self.file_failures,
            self.status_failures,
            self.refreshed
        );
        if self.simulated > 0 {
            format!("{summary} (dry run, {} actions simulated)", self.simulated)
        } else {
            summary
        }
    }

    fn record(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::Applied => true,
            Effect::Simulated => {
                self.simulated += 1;
                false
            }
        }
    }
}

/// One show, start to finish: resolve policy, fetch and classify the
/// inventory, plan, retire each planned episode, refresh once.
pub(crate) fn process_show<A, F, E>(
    config: &Config,
    show_id: &str,
    api: &A,
    files: &F,
    executor: &mut E,
) -> Outcome
where
    A: LibraryApi,
    F: FileStore,
    E: Executor,
{
    let Some((show, policy)) = config.resolve_policy(show_id) else {
        return Outcome::Aborted(AbortReason::NotConfigured(show_id.to_string()));
    };
    debug!(
        "Global removal switches, Archived={}, Downloaded={}",
        policy.global.covers_archived(),
        policy.global.covers_downloaded()
    );
    debug!("Reading show: {show_id} - {}", show.name);

    let inventory_unavailable = |detail: String| {
        Outcome::Aborted(AbortReason::InventoryUnavailable {
            show_id: show_id.to_string(),
            detail,
        })
    };
    let inventory = match api.list_seasons(show_id) {
        Ok(inventory) => inventory,
        Err(err) => return inventory_unavailable(err.to_string()),
    };
    let buckets = match classify(&inventory) {
        Ok(buckets) => buckets,
        Err(err) => return inventory_unavailable(err.to_string()),
    };

    let deletion_plan = plan(&buckets, &policy);
    log_plan(
        show_id,
        &policy,
        buckets.archived.len(),
        buckets.downloaded.len(),
        &deletion_plan,
    );

    if deletion_plan.is_empty() {
        debug!("Show {show_id}: nothing to retire");
    }

    let mut report = RunReport::default();
    for &episode in deletion_plan.iter() {
        retire_episode(show_id, episode, api, files, executor, &mut report);
    }

    match executor.refresh_show(show_id) {
        Ok(effect) => report.refreshed = report.record(effect),
        Err(err) => warn!("Show {show_id}: {err:#}"),
    }

    report.plan = deletion_plan;
    Outcome::Done(report)
}

fn log_plan(
    show_id: &str,
    policy: &RetentionPolicy,
    archived_found: usize,
    downloaded_found: usize,
    plan: &DeletionPlan,
) {
    info!("Show {show_id}: Found {archived_found} archived episodes");
    if !policy.removes_archived() {
        info!("Show {show_id}: Archived episodes won't be deleted");
    } else if plan.archived.is_empty() {
        info!("Show {show_id}: No archived episodes to delete");
    } else {
        info!(
            "Show {show_id}: Deleting {} archived episodes",
            plan.archived.len()
        );
    }

    info!("Show {show_id}: Found {downloaded_found} downloaded episodes");
    if !policy.removes_downloaded() {
        info!("Show {show_id}: Downloaded episodes won't be deleted");
    } else if plan.downloaded.is_empty() {
        info!("Show {show_id}: No downloaded episodes to delete");
    } else {
        info!(
            "Show {show_id}: Deleting {} downloaded episodes (keeping {})",
            plan.downloaded.len(),
            policy.keep_episodes
        );
    }
}

/// Locate, sweep companion files, then mark the episode so it is not
/// fetched again. A crash between the sweep and the status update leaves
/// files gone with the status still set; nothing here repairs that.
fn retire_episode<A, F, E>(
    show_id: &str,
    episode: EpisodeRef,
    api: &A,
    files: &F,
    executor: &mut E,
    report: &mut RunReport,
) where
    A: LibraryApi,
    F: FileStore,
    E: Executor,
{
    let primary = match api.locate_episode_file(show_id, episode) {
        Ok(Some(path)) => path,
        Ok(None) => {
            warn!("Show {show_id}: no file on record for {episode}, skipping");
            report.skipped.push(episode);
            return;
        }
        Err(err) => {
            warn!("Show {show_id}: unable to locate {episode}: {err}");
            report.skipped.push(episode);
            return;
        }
    };

    info!("cleaning: {episode}");
    let companions = files.sibling_files(&primary).unwrap_or_else(|err| {
        warn!("unable to list files next to {}: {err}", primary.display());
        Vec::new()
    });
    for path in companions {
        info!("Delete file: {}", path.display());
        match executor.delete_file(&path) {
            Ok(effect) => {
                if report.record(effect) {
                    report.files_deleted += 1;
                }
            }
            Err(err) => {
                warn!("{err:#}");
                report.file_failures += 1;
            }
        }
    }

    match executor.mark_retired(show_id, episode) {
        Ok(effect) => {
            report.record(effect);
        }
        Err(err) => {
            warn!("Show {show_id}: {err:#}");
            report.status_failures += 1;
        }
    }
}
