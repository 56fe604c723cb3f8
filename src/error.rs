/// Errors from the fallible edges of this crate.
///
/// Failed validation checks are never reported through this type;
/// they are data in a [ValidationResult](crate::ValidationResult).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The value being validated could not be represented as JSON.
    #[error("unable to convert value for validation: {0}")]
    Serialize(#[source] serde_json::Error),
    /// A defaults patch could not be read.
    #[error("invalid validation defaults: {0}")]
    Defaults(#[source] serde_json::Error),
}
