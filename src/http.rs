use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy)]
pub(crate) struct RetrySettings {
    pub(crate) connect_timeout: Duration,
    pub(crate) read_timeout: Duration,
    pub(crate) attempts: usize,
    pub(crate) retry_delay: Duration,
}

impl RetrySettings {
    pub(crate) fn new(timeout: Duration, attempts: usize) -> Self {
        Self {
            connect_timeout: timeout,
            read_timeout: timeout,
            attempts,
            retry_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum HttpError {
    #[error("HTTP status {status}{} after {attempts} attempt(s)", body_suffix(.body))]
    Status {
        status: u16,
        body: String,
        attempts: usize,
    },

    #[error("transport error after {attempts} attempt(s): {message}")]
    Transport { message: String, attempts: usize },

    #[error("response decode failed: {0}")]
    Decode(String),
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(" ({body})")
    }
}

// ureq's own Display leads with the request URL, which carries the API key.
fn describe_transport(err: &ureq::Transport, url: &str) -> String {
    let mut message = err.kind().to_string();
    if let Some(detail) = err.message() {
        message.push_str(": ");
        message.push_str(detail);
    }
    if let Some(source) = std::error::Error::source(err) {
        message.push_str(&format!(": {source}"));
    }
    if let Some(request_url) = err.url() {
        message = message.replace(request_url.as_str(), "<request url>");
    }
    message.replace(url, "<request url>")
}

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

pub(crate) fn get_text_with_retries(
    url: &str,
    query: &[(&str, String)],
    settings: &RetrySettings,
) -> Result<String, HttpError> {
    let attempts = settings.attempts.max(1);
    let agent = ureq::AgentBuilder::new()
        .timeout_connect(settings.connect_timeout)
        .timeout_read(settings.read_timeout)
        .timeout_write(settings.read_timeout)
        .build();

    let mut attempt = 1;
    loop {
        let mut request = agent.get(url);
        for (key, value) in query {
            request = request.query(key, value);
        }

        let failure = match request.call() {
            Ok(response) => {
                return response
                    .into_string()
                    .map_err(|err| HttpError::Decode(err.to_string()));
            }
            Err(ureq::Error::Status(status, response)) => {
                let response_body = response.into_string().ok().unwrap_or_default();
                let body = response_body.trim().chars().take(240).collect::<String>();
                let retryable = should_retry_http_status(status);
                let err = HttpError::Status {
                    status,
                    body,
                    attempts: attempt,
                };
                if !retryable {
                    return Err(err);
                }
                err
            }
            Err(ureq::Error::Transport(err)) => HttpError::Transport {
                message: describe_transport(&err, url),
                attempts: attempt,
            },
        };

        if attempt >= attempts {
            return Err(failure);
        }
        debug!("request attempt {attempt}/{attempts} failed: {failure}; retrying");
        thread::sleep(settings.retry_delay);
        attempt += 1;
    }
}
