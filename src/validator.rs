use crate::{FieldValidator, Validation};
use serde_json::Value;
use std::fmt::Debug;

/// All the checks for one field. Every check runs, and the failure
/// messages are collected in the order the checks were added.
///
/// ## Example
/// ```
/// use object_validation::{length, is_required, Validation, Validator};
/// use serde_json::json;
///
/// let v = Validator::new()
///     .validation(is_required(()))
///     .validation(length(json!({ "length": 6 })));
///
/// let object = json!({});
/// assert_eq!(None, v.validate_value(&json!("bethesda"), &object));
/// assert_eq!(
///     Some(vec!["has to be at least 6 characters long".to_string()]),
///     v.validate_value(&json!("bob"), &object)
/// );
/// ```
#[derive(Clone, Default)]
pub struct Validator {
    pub validations: Vec<FieldValidator>,
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        self.validations.len() == other.validations.len()
            && self
                .validations
                .iter()
                .zip(other.validations.iter())
                .all(|(this_validation, other_validation)| this_validation == other_validation)
    }
}

impl Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let validations: Vec<String> = self
            .validations
            .iter()
            .map(|validation| format!("{:?}", validation))
            .collect();

        write!(f, "Validator{{{0}}}", validations.join(", "))
    }
}

impl Validator {
    /// Create a new `Validator`.
    pub fn new() -> Self {
        Self {
            validations: Vec::new(),
        }
    }

    /// A factory method to add a check to this validator.
    pub fn validation<F: Into<FieldValidator>>(mut self, validator_fn: F) -> Self {
        self.validations.push(validator_fn.into());
        self
    }
}

impl Validation for Validator {
    fn validate_value(&self, value: &Value, object: &Value) -> Option<Vec<String>> {
        let messages: Vec<String> = self
            .validations
            .iter()
            .filter_map(|validation| validation.check(value, object))
            .collect();

        if messages.is_empty() {
            None
        } else {
            Some(messages)
        }
    }
}

impl From<FieldValidator> for Validator {
    fn from(validator_fn: FieldValidator) -> Self {
        Validator::new().validation(validator_fn)
    }
}

/// Compose checks into a [Validator].
///
/// An entry of `None` stands for something that is not a check, for
/// example a rule whose construction was skipped. It is logged and
/// left out; the other checks are still composed.
///
/// See also the [v!](crate::v!) macro.
pub fn v<I>(validations: I) -> Validator
where
    I: IntoIterator,
    I::Item: Into<Option<FieldValidator>>,
{
    let mut validator = Validator::new();

    for (index, validation) in validations.into_iter().enumerate() {
        match validation.into() {
            Some(validation) => validator.validations.push(validation),
            None => tracing::warn!(index, "skipping rule that is not a validator"),
        }
    }

    validator
}

/// Compose checks into a [Validator], in the order given.
///
/// ## Example
/// ```
/// use object_validation::{is_required, length, password_complexity, v, Validation};
/// use serde_json::json;
///
/// let password = v![
///     is_required(()),
///     length(json!({ "length": 5 })),
///     password_complexity(()),
/// ];
///
/// let messages = password.validate_value(&json!("test"), &json!({})).unwrap();
/// assert_eq!(2, messages.len());
/// ```
#[macro_export]
macro_rules! v {
    ($($validation:expr),* $(,)?) => {
        $crate::v(::std::vec::Vec::<::std::option::Option<$crate::FieldValidator>>::from([
            $(::std::convert::Into::<::std::option::Option<$crate::FieldValidator>>::into($validation)),*
        ]))
    };
}
