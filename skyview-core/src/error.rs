use thiserror::Error;

/// Lookup failures the application reports with a dedicated message.
///
/// Providers return these wrapped in `anyhow::Error`; everything else
/// (transport, status, parse errors) is treated as a generic fetch failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("City not found")]
    CityNotFound,

    #[error("No weather data available")]
    NoData,

    #[error("Provider '{provider}' does not support {what} lookups")]
    Unsupported {
        provider: &'static str,
        what: &'static str,
    },
}

impl LookupError {
    /// Find a `LookupError` anywhere in an `anyhow` chain.
    pub fn find(err: &anyhow::Error) -> Option<&LookupError> {
        err.chain().find_map(|cause| cause.downcast_ref::<LookupError>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn found_through_context() {
        let err = Err::<(), _>(LookupError::CityNotFound)
            .context("searching for Atlantis")
            .unwrap_err();

        assert_eq!(LookupError::find(&err), Some(&LookupError::CityNotFound));
    }

    #[test]
    fn absent_for_other_errors() {
        let err = anyhow::anyhow!("connection refused");
        assert!(LookupError::find(&err).is_none());
    }
}
