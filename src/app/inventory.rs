use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct EpisodeRef {
    pub(crate) season: u32,
    pub(crate) episode: u32,
}

impl EpisodeRef {
    pub(crate) const fn new(season: u32, episode: u32) -> Self {
        Self { season, episode }
    }
}

impl fmt::Display for EpisodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}E{}", self.season, self.episode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EpisodeStatus {
    Downloaded,
    Archived,
    Other(String),
}

impl EpisodeStatus {
    pub(crate) fn from_api(raw: &str) -> Self {
        match raw {
            "Downloaded" => Self::Downloaded,
            "Archived" => Self::Archived,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Season key → episode key → status, keys as the service reports them.
pub(crate) type ShowInventory = BTreeMap<String, BTreeMap<String, EpisodeStatus>>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Buckets {
    pub(crate) archived: Vec<EpisodeRef>,
    pub(crate) downloaded: Vec<EpisodeRef>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum InventoryError {
    #[error("inventory is empty")]
    Empty,
}

const SPECIALS_SEASON: u32 = 0;

pub(crate) fn classify(inventory: &ShowInventory) -> Result<Buckets, InventoryError> {
    if inventory.is_empty() {
        return Err(InventoryError::Empty);
    }

    let mut buckets = Buckets::default();
    for (season_key, episodes) in inventory {
        let Some(season) = parse_key(season_key) else {
            warn!("skipping unparsable season key `{season_key}`");
            continue;
        };
        if season == SPECIALS_SEASON {
            continue;
        }

        for (episode_key, status) in episodes {
            let Some(episode) = parse_key(episode_key) else {
                warn!("skipping unparsable episode key `{episode_key}` in season {season}");
                continue;
            };
            let episode_ref = EpisodeRef::new(season, episode);
            match status {
                EpisodeStatus::Downloaded => buckets.downloaded.push(episode_ref),
                EpisodeStatus::Archived => buckets.archived.push(episode_ref),
                EpisodeStatus::Other(_) => {}
            }
        }
    }

    // String keys iterate as "10" < "2"; restore numeric order. Padded keys
    // ("01" and "1") name the same episode and must not be retired twice.
    buckets.archived.sort_unstable();
    buckets.archived.dedup();
    buckets.downloaded.sort_unstable();
    buckets.downloaded.dedup();
    let archived = &buckets.archived;
    buckets
        .downloaded
        .retain(|episode| archived.binary_search(episode).is_err());
    Ok(buckets)
}

fn parse_key(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}
