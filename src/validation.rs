use serde_json::Value;

/// A function/struct/item that checks a single field value, in the
/// context of the whole object it was taken from.
pub trait Validation {
    /// Validate `value`, the content of one field of `object`.
    /// Returns the failure messages in the order they were produced,
    /// or `None` if the value passed every check.
    fn validate_value(&self, value: &Value, object: &Value) -> Option<Vec<String>>;
}
