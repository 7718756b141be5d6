use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Engine error taxonomy. Read paths degrade to `Ok(empty)` when data is
/// simply absent; `StoreUnavailable` is reserved for actual I/O failures
/// so callers can tell an outage from an empty catalog.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("interaction store unavailable: {0}")]
    StoreUnavailable(#[source] anyhow::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn store(err: impl Into<anyhow::Error>) -> Self {
        EngineError::StoreUnavailable(err.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidInput(msg.into())
    }

    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, EngineError::StoreUnavailable(_))
    }
}

impl From<sqlx::Error> for EngineError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => EngineError::NotFound("record"),
            other => EngineError::StoreUnavailable(other.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_unavailable_classification() {
        let err = EngineError::store(anyhow::anyhow!("connection refused"));
        assert!(err.is_store_unavailable());

        let err = EngineError::NotFound("product");
        assert!(!err.is_store_unavailable());
        assert_eq!(err.to_string(), "product not found");
    }

    #[test]
    fn test_sqlx_row_not_found_maps_to_not_found() {
        let err: EngineError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, EngineError::NotFound(_)));
    }
}
