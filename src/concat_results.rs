use crate::ValidationResult;

/// Join validation results, for example from validating parts of a
/// form separately. Messages for a field that failed in more than one
/// result are concatenated in order.
///
/// ## Example
/// ```
/// use object_validation::{concat_results, is_required, email, v, validate, RuleTree};
/// use serde_json::json;
///
/// let object = json!({ "email": "nope" });
/// let results = vec![
///     validate(RuleTree::new().field("email", v![email(())])).validate(&object),
///     validate(RuleTree::new().field("name", v![is_required(())])).validate(&object),
///     validate(RuleTree::new().field("email", v![is_required(())])).validate(&object),
/// ];
///
/// let result = concat_results(results);
/// assert_eq!(
///     json!({ "email": ["is not a valid email address"], "name": ["is required"] }),
///     result.to_json()
/// );
/// ```
pub fn concat_results<I>(results: I) -> ValidationResult
where
    I: IntoIterator<Item = ValidationResult>,
{
    let mut all_results = ValidationResult::default();

    for result in results {
        all_results.extend(result);
    }

    all_results
}
