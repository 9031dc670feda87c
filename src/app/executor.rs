use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::files::FileStore;
use super::inventory::EpisodeRef;
use crate::sickbeard::LibraryApi;

const RETIRED_STATUS: &str = "ignored";

/// Whether a step actually changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Effect {
    Applied,
    Simulated,
}

/// Every side-effecting step of a run goes through here. The plan and all
/// read-only lookups are identical whichever implementation is used.
pub(crate) trait Executor {
    fn delete_file(&mut self, path: &Path) -> Result<Effect>;

    fn mark_retired(&mut self, show_id: &str, episode: EpisodeRef) -> Result<Effect>;

    fn refresh_show(&mut self, show_id: &str) -> Result<Effect>;
}

pub(crate) struct LiveExecutor<'a, A, F> {
    api: &'a A,
    files: &'a F,
}

impl<'a, A: LibraryApi, F: FileStore> LiveExecutor<'a, A, F> {
    pub(crate) fn new(api: &'a A, files: &'a F) -> Self {
        Self { api, files }
    }
}

impl<A: LibraryApi, F: FileStore> Executor for LiveExecutor<'_, A, F> {
    fn delete_file(&mut self, path: &Path) -> Result<Effect> {
        self.files
            .delete_file(path)
            .with_context(|| format!("failed to delete {}", path.display()))?;
        Ok(Effect::Applied)
    }

    fn mark_retired(&mut self, show_id: &str, episode: EpisodeRef) -> Result<Effect> {
        self.api
            .set_episode_status(show_id, episode, RETIRED_STATUS, true)
            .with_context(|| format!("failed to set {episode} status to {RETIRED_STATUS}"))?;
        Ok(Effect::Applied)
    }

    fn refresh_show(&mut self, show_id: &str) -> Result<Effect> {
        self.api
            .refresh_show(show_id)
            .with_context(|| format!("failed to refresh show {show_id}"))?;
        Ok(Effect::Applied)
    }
}

/// Logs what would happen and touches nothing.
#[derive(Debug, Default)]
pub(crate) struct DryRunExecutor;

impl Executor for DryRunExecutor {
    fn delete_file(&mut self, path: &Path) -> Result<Effect> {
        info!("DEBUG: Deleted file: {}", path.display());
        Ok(Effect::Simulated)
    }

    fn mark_retired(&mut self, _show_id: &str, episode: EpisodeRef) -> Result<Effect> {
        info!("DEBUG: {episode} update status: OK");
        Ok(Effect::Simulated)
    }

    fn refresh_show(&mut self, show_id: &str) -> Result<Effect> {
        info!("{show_id}: DEBUG: Refreshing show");
        Ok(Effect::Simulated)
    }
}
