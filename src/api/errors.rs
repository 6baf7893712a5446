//! Error types for the school backend client.

#[derive(Debug, thiserror::Error)]
pub enum SchoolApiError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("backend responded {status} for {url}")]
    Status { status: u16, url: String },
    #[error("failed to parse response from {url}")]
    ParseFailed {
        status: u16,
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("backend returned no data for {0}")]
    EmptyPayload(String),
    #[error(transparent)]
    RequestFailed(#[from] anyhow::Error),
}

impl From<reqwest_middleware::Error> for SchoolApiError {
    fn from(e: reqwest_middleware::Error) -> Self {
        Self::RequestFailed(anyhow::Error::new(e))
    }
}

impl From<reqwest::Error> for SchoolApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::RequestFailed(anyhow::Error::new(e))
    }
}
