use crate::{Error, ObjectValidator, ValidationResult};
use serde::Serialize;

/// An item that can be validated against a rule tree.
///
/// Implemented for everything that serializes to a JSON object, so
/// typed forms and models can be checked without converting them by
/// hand.
///
/// ## Example
/// ```
/// use object_validation::{email, v, validate, RuleTree, Validatable};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct SignUp {
///     email: String,
/// }
///
/// let validator = validate(RuleTree::new().field("email", v![email(())]));
/// let form = SignUp { email: "not an email".to_string() };
///
/// let result = form.validate_with(&validator).unwrap();
/// assert_eq!(Some(&["is not a valid email address".to_string()][..]), result.messages("email"));
/// ```
pub trait Validatable {
    /// Validate this item. Returns the fields that failed, or an
    /// [Error] if this item could not be represented as JSON.
    fn validate_with(&self, validator: &ObjectValidator) -> Result<ValidationResult, Error>;

    /// Returns true if no field of this item failed.
    fn is_valid_with(&self, validator: &ObjectValidator) -> Result<bool, Error> {
        self.validate_with(validator).map(|result| result.is_empty())
    }
}

impl<T> Validatable for T
where
    T: Serialize + ?Sized,
{
    fn validate_with(&self, validator: &ObjectValidator) -> Result<ValidationResult, Error> {
        let object = serde_json::to_value(self).map_err(Error::Serialize)?;
        Ok(validator.validate(&object))
    }
}
