use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::app::inventory::{EpisodeRef, EpisodeStatus, ShowInventory};
use crate::config::ServerConfig;
use crate::http::{HttpError, RetrySettings, get_text_with_retries};

#[derive(Debug, Error)]
pub(crate) enum ApiError {
    #[error("`{cmd}` request failed: {source}")]
    Http {
        cmd: &'static str,
        #[source]
        source: HttpError,
    },

    #[error("`{cmd}` returned invalid JSON: {source}")]
    Json {
        cmd: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("`{cmd}` was rejected: {message}")]
    Rejected { cmd: &'static str, message: String },
}

/// The operations the retention run needs from the library manager.
pub(crate) trait LibraryApi {
    fn list_seasons(&self, show_id: &str) -> Result<ShowInventory, ApiError>;

    /// `Ok(None)` when the episode has no file on record.
    fn locate_episode_file(
        &self,
        show_id: &str,
        episode: EpisodeRef,
    ) -> Result<Option<PathBuf>, ApiError>;

    fn set_episode_status(
        &self,
        show_id: &str,
        episode: EpisodeRef,
        status: &str,
        force: bool,
    ) -> Result<(), ApiError>;

    fn refresh_show(&self, show_id: &str) -> Result<(), ApiError>;
}

pub(crate) struct SickBeardClient {
    api_url: String,
    retry: RetrySettings,
}

impl SickBeardClient {
    pub(crate) fn new(server: &ServerConfig) -> Self {
        Self {
            api_url: server.api_url(),
            retry: RetrySettings::new(server.timeout(), server.retries),
        }
    }

    fn request(&self, cmd: &'static str, params: &[(&str, String)]) -> Result<Value, ApiError> {
        let mut query = vec![("cmd", cmd.to_string())];
        query.extend(params.iter().map(|(key, value)| (*key, value.clone())));

        // The URL embeds the API key; only the command is logged.
        debug!("sickbeard request: cmd={cmd} params={params:?}");
        let raw = get_text_with_retries(&self.api_url, &query, &self.retry)
            .map_err(|source| ApiError::Http { cmd, source })?;
        parse_envelope(cmd, &raw)
    }
}

fn episode_params(show_id: &str, episode: EpisodeRef) -> Vec<(&'static str, String)> {
    vec![
        ("tvdbid", show_id.to_string()),
        ("season", episode.season.to_string()),
        ("episode", episode.episode.to_string()),
    ]
}

impl LibraryApi for SickBeardClient {
    fn list_seasons(&self, show_id: &str) -> Result<ShowInventory, ApiError> {
        let data = self.request("show.seasons", &[("tvdbid", show_id.to_string())])?;
        Ok(parse_seasons(&data))
    }

    fn locate_episode_file(
        &self,
        show_id: &str,
        episode: EpisodeRef,
    ) -> Result<Option<PathBuf>, ApiError> {
        let mut params = episode_params(show_id, episode);
        params.push(("full_path", "1".to_string()));
        let data = self.request("episode", &params)?;
        Ok(parse_location(&data))
    }

    fn set_episode_status(
        &self,
        show_id: &str,
        episode: EpisodeRef,
        status: &str,
        force: bool,
    ) -> Result<(), ApiError> {
        let mut params = episode_params(show_id, episode);
        params.push(("status", status.to_string()));
        params.push(("force", u8::from(force).to_string()));
        self.request("episode.setstatus", &params)?;
        Ok(())
    }

    fn refresh_show(&self, show_id: &str) -> Result<(), ApiError> {
        self.request("show.refresh", &[("tvdbid", show_id.to_string())])?;
        Ok(())
    }
}

/// Unwraps `{"result": "success", "data": ...}`; any other result is an error
/// carrying the service's message.
pub(crate) fn parse_envelope(cmd: &'static str, raw: &str) -> Result<Value, ApiError> {
    let mut parsed: Value =
        serde_json::from_str(raw).map_err(|source| ApiError::Json { cmd, source })?;

    let result = parsed.get("result").and_then(Value::as_str).unwrap_or("");
    if result != "success" {
        let message = parsed
            .get("message")
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .unwrap_or("no message")
            .to_string();
        return Err(ApiError::Rejected {
            cmd,
            message: format!("{result}: {message}"),
        });
    }

    Ok(parsed.get_mut("data").map(Value::take).unwrap_or(Value::Null))
}

pub(crate) fn parse_seasons(data: &Value) -> ShowInventory {
    let Some(seasons) = data.as_object() else {
        return ShowInventory::new();
    };

    seasons
        .iter()
        .filter_map(|(season_key, episodes)| {
            let episodes = episodes.as_object()?;
            let statuses: BTreeMap<String, EpisodeStatus> = episodes
                .iter()
                .map(|(episode_key, detail)| {
                    let status = detail.get("status").and_then(Value::as_str).unwrap_or("");
                    (episode_key.clone(), EpisodeStatus::from_api(status))
                })
                .collect();
            Some((season_key.clone(), statuses))
        })
        .collect()
}

pub(crate) fn parse_location(data: &Value) -> Option<PathBuf> {
    let location = data.get("location")?.as_str()?.trim();
    if location.is_empty() {
        None
    } else {
        Some(PathBuf::from(location))
    }
}
