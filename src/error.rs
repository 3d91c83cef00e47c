use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Failures surfaced by the cleaning pipeline, the providers and the query layer
#[derive(Debug, Error)]
pub enum Error {
    /// Bad kind name, malformed path parameter or conflicting options
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// A lookup matched zero rows
    #[error("no results: {0}")]
    NotFound(String),

    /// Reference or species provider unreachable, or returned garbage
    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl Error {
    /// Only connectivity failures are worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Connectivity(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Connectivity(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_connectivity_is_transient() {
        assert!(Error::Connectivity("timeout".into()).is_transient());
        assert!(!Error::NotFound("pikachu".into()).is_transient());
        assert!(!Error::Conflict("pikachu".into()).is_transient());
        assert!(!Error::Storage(rusqlite::Error::InvalidQuery).is_transient());
    }
}
