use serde::Deserialize;

use super::inventory::{Buckets, EpisodeRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RemoveMode {
    #[default]
    All,
    Archived,
    Downloaded,
    None,
}

impl RemoveMode {
    pub(crate) const fn covers_archived(self) -> bool {
        matches!(self, Self::All | Self::Archived)
    }

    pub(crate) const fn covers_downloaded(self) -> bool {
        matches!(self, Self::All | Self::Downloaded)
    }
}

/// Effective policy for one show: the global switch narrowed by the show's
/// own mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub global: RemoveMode,
    pub show: RemoveMode,
    pub keep_episodes: usize,
}

impl RetentionPolicy {
    pub(crate) const fn removes_archived(&self) -> bool {
        self.global.covers_archived() && self.show.covers_archived()
    }

    pub(crate) const fn removes_downloaded(&self) -> bool {
        self.global.covers_downloaded() && self.show.covers_downloaded()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DeletionPlan {
    pub(crate) archived: Vec<EpisodeRef>,
    /// Oldest first.
    pub(crate) downloaded: Vec<EpisodeRef>,
}

impl DeletionPlan {
    pub(crate) fn is_empty(&self) -> bool {
        self.archived.is_empty() && self.downloaded.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.archived.len() + self.downloaded.len()
    }

    /// Archived selections first, then downloaded oldest-first.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &EpisodeRef> {
        self.archived.iter().chain(self.downloaded.iter())
    }
}

pub(crate) fn plan(buckets: &Buckets, policy: &RetentionPolicy) -> DeletionPlan {
    let archived = if policy.removes_archived() {
        buckets.archived.clone()
    } else {
        Vec::new()
    };

    let downloaded = if policy.removes_downloaded() {
        select_oldest_excess(&buckets.downloaded, policy.keep_episodes)
    } else {
        Vec::new()
    };

    DeletionPlan {
        archived,
        downloaded,
    }
}

// Ordering is by (season, episode) only; air date never participates.
fn select_oldest_excess(downloaded: &[EpisodeRef], keep: usize) -> Vec<EpisodeRef> {
    let excess = downloaded.len().saturating_sub(keep);
    if excess == 0 {
        return Vec::new();
    }

    let mut sorted = downloaded.to_vec();
    sorted.sort_unstable();
    sorted.truncate(excess);
    sorted
}
