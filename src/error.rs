use thiserror::Error;

/// Failure categories the pipeline distinguishes. Only `Auth` aborts a run;
/// everything else drops the affected event or player and keeps going.
#[derive(Debug, Error)]
pub enum PropError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("no data: {0}")]
    NoData(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("no roster match for {0:?}")]
    Resolution(String),
}

impl PropError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, PropError::Auth(_))
    }
}
