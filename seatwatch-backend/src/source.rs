//! Contracts of the upstream collaborators the watch engine consumes.

use async_trait::async_trait;
use seatwatch_common::SeatStatus;

/// Why one upstream seat query failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("upstream timed out")]
    Timeout,
    #[error("connection failure: {0}")]
    ConnectionFailure(String),
    #[error("could not parse upstream page: {0}")]
    ParseFailure(String),
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),
}

impl QueryError {
    /// Short label used in logs and user replies
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::Timeout => "timeout",
            QueryError::ConnectionFailure(_) => "connection",
            QueryError::ParseFailure(_) => "parse",
            QueryError::UpstreamStatus(_) => "http-status",
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            QueryError::Timeout
        } else if let Some(status) = e.status() {
            QueryError::UpstreamStatus(status.as_u16())
        } else if e.is_decode() || e.is_body() {
            QueryError::ParseFailure(e.to_string())
        } else {
            QueryError::ConnectionFailure(e.to_string())
        }
    }
}

/// Looks up the current seat counts of one section
#[async_trait]
pub trait SeatSource: Send + Sync {
    async fn query(&self, provider_id: &str, section: &str) -> Result<SeatStatus, QueryError>;
}

/// Maps a 3-letter program code to the upstream program identifier
pub trait CatalogResolver: Send + Sync {
    fn resolve(&self, program: &str) -> Option<String>;

    /// All known program codes, sorted
    fn program_codes(&self) -> Vec<String>;
}
