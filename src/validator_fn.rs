use crate::Validation;
use serde_json::Value;
use std::{fmt::Debug, rc::Rc};
use uuid::Uuid;

type FieldValidatorTraitObject = dyn Fn(&Value, &Value) -> Option<String>;

/// A single check on a field value.
///
/// Called with the field value and the whole object, it returns the
/// failure message, or `None` if the value passes.
///
/// ## Example
///
/// ```
/// use object_validation::{FieldValidator, Validation};
/// use serde_json::{json, Value};
///
/// let v = FieldValidator::new(|value: &Value, _object: &Value| {
///     match value.as_i64() {
///         Some(n) if n < 0 => Some(format!("{} cannot be less than 0", n)),
///         _ => None,
///     }
/// });
///
/// let object = json!({});
/// assert_eq!(None, v.check(&json!(20), &object));
/// assert_eq!(Some("-1 cannot be less than 0".to_string()), v.check(&json!(-1), &object));
/// assert_eq!(
///     Some(vec!["-1 cannot be less than 0".to_string()]),
///     v.validate_value(&json!(-1), &object)
/// );
/// ```
pub struct FieldValidator {
    closure: Rc<FieldValidatorTraitObject>,
    id: Uuid,
}

impl FieldValidator {
    /// Create a new `FieldValidator`.
    pub fn new<C>(closure: C) -> Self
    where
        C: Fn(&Value, &Value) -> Option<String> + 'static,
    {
        Self {
            closure: Rc::new(closure),
            id: Uuid::new_v4(),
        }
    }

    /// Run the check against `value`, a field of `object`.
    pub fn check(&self, value: &Value, object: &Value) -> Option<String> {
        (self.closure)(value, object)
    }
}

impl Clone for FieldValidator {
    fn clone(&self) -> Self {
        Self {
            closure: Rc::clone(&self.closure),
            id: self.id,
        }
    }
}

impl PartialEq for FieldValidator {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<C> From<C> for FieldValidator
where
    C: Fn(&Value, &Value) -> Option<String> + 'static,
{
    fn from(closure: C) -> Self {
        FieldValidator::new(closure)
    }
}

impl Debug for FieldValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "FieldValidator(closure: {:p}, id: {})",
            self.closure, self.id
        )
    }
}

impl Validation for FieldValidator {
    fn validate_value(&self, value: &Value, object: &Value) -> Option<Vec<String>> {
        self.check(value, object).map(|message| vec![message])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clones_compare_equal() {
        let v = FieldValidator::new(|_, _| None);
        let clone = v.clone();
        let other = FieldValidator::new(|_, _| None);

        assert_eq!(v, clone);
        assert_ne!(v, other);
    }

    #[test]
    fn receives_whole_object() {
        let v = FieldValidator::new(|value: &Value, object: &Value| {
            if object.get("other") == Some(value) {
                None
            } else {
                Some("differs".to_string())
            }
        });
        let object = json!({ "other": 1 });

        assert_eq!(None, v.check(&json!(1), &object));
        assert_eq!(Some("differs".to_string()), v.check(&json!(2), &object));
    }
}
