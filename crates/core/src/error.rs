//! Unified error types for offcache.

use tokio_rusqlite::rusqlite;

/// Transport-level failure reported by the network fetch capability.
///
/// Only failures of transport (timeout, refused connection, interrupted
/// body) are `FetchError`s. An HTTP response with an error status is a
/// resolved fetch and is not represented here.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established (offline, DNS, refused).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The response body exceeded the configured size cap.
    #[error("response exceeded {limit} bytes")]
    TooLarge { limit: usize },

    /// Any other transport failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Unified error type for the cache manager and its store.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A manifest fetch failed during install; the generation is only
    /// partially populated and install should be retried.
    #[error("precache of {resource} failed: {source}")]
    Precache { resource: String, source: FetchError },

    /// The offline fallback was requested but is not in the store.
    #[error("offline fallback {0} is not cached")]
    MissingFallback(String),

    /// Neither cache nor network could satisfy a sub-resource request.
    #[error("{url} unavailable from cache and network: {source}")]
    ResourceUnavailable { url: String, source: FetchError },

    /// Opaque transport failure bubbled from the network capability.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Cache store operation failed.
    #[error("store error: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("store error: migration failed: {0}")]
    MigrationFailed(String),

    /// A resource identifier could not be resolved to a URL.
    #[error("invalid resource identifier: {0}")]
    InvalidUrl(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precache_display() {
        let err = Error::Precache {
            resource: "/styles.css".to_string(),
            source: FetchError::Connect("refused".to_string()),
        };
        assert!(err.to_string().contains("/styles.css"));
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn test_missing_fallback_display() {
        let err = Error::MissingFallback("/offline.html".to_string());
        assert!(err.to_string().contains("/offline.html"));
    }

    #[test]
    fn test_fetch_error_is_transparent() {
        let err: Error = FetchError::Timeout("20s elapsed".to_string()).into();
        assert_eq!(err.to_string(), "request timed out: 20s elapsed");
    }
}
