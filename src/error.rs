//! Error taxonomy for control-limit computation.
//!
//! Every failure is reported before any output is produced: a call either
//! returns the complete augmented table or one of these errors.

/// Structured error type for the chart engine.
///
/// - `Configuration`: malformed stratification, unknown model identifier,
///   invalid screening constants.
/// - `Division`: arithmetic that would otherwise produce a non-finite value
///   (single-row groups, zero dispersion, non-positive denominators).
/// - `Schema`: a required column is absent, holds non-numeric cells, or a
///   computed column name is already taken.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ShewhartError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("division error: {0}")]
    Division(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[cfg(feature = "csv")]
    #[error("i/o error: {0}")]
    Io(String),
}

impl ShewhartError {
    /// Creates a `ShewhartError::Configuration`.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Creates a `ShewhartError::Division`.
    pub fn division(msg: impl Into<String>) -> Self {
        Self::Division(msg.into())
    }

    /// Creates a `ShewhartError::Schema`.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Prefix the message with where the failure happened, keeping the variant.
    pub fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Self::Configuration(m) => Self::Configuration(format!("{ctx}: {m}")),
            Self::Division(m) => Self::Division(format!("{ctx}: {m}")),
            Self::Schema(m) => Self::Schema(format!("{ctx}: {m}")),
            #[cfg(feature = "csv")]
            Self::Io(m) => Self::Io(format!("{ctx}: {m}")),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ShewhartError>;

#[cfg(test)]
mod tests {
    use super::ShewhartError;

    #[test]
    fn helper_constructors_create_expected_variants() {
        match ShewhartError::configuration("strata list is empty") {
            ShewhartError::Configuration(msg) => assert_eq!(msg, "strata list is empty"),
            other => panic!("expected Configuration, got {other:?}"),
        }

        match ShewhartError::division("group [\"a\"] has 1 row") {
            ShewhartError::Division(msg) => assert_eq!(msg, "group [\"a\"] has 1 row"),
            other => panic!("expected Division, got {other:?}"),
        }

        match ShewhartError::schema("column 'visits' not found") {
            ShewhartError::Schema(msg) => assert_eq!(msg, "column 'visits' not found"),
            other => panic!("expected Schema, got {other:?}"),
        }
    }

    #[test]
    fn context_keeps_variant() {
        let err = ShewhartError::division("1 row").context("group [north]");
        assert_eq!(err, ShewhartError::Division("group [north]: 1 row".into()));
    }

    #[test]
    fn display_messages_name_the_category() {
        assert_eq!(
            ShewhartError::division("zero dispersion").to_string(),
            "division error: zero dispersion"
        );
        assert_eq!(
            ShewhartError::schema("column 'x' not found").to_string(),
            "schema error: column 'x' not found"
        );
    }
}
