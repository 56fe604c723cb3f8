//! The built-in rules.
//!
//! Each rule reads its default message and the transform pipeline from
//! a [DefaultsStore] when it is given its options, so later calls to
//! [set_defaults](crate::set_defaults) only affect rules built after
//! them. The free functions use the process-wide store.
//!
//! Apart from [is_required], rules treat a missing or empty value as
//! valid.

use crate::{names, DefaultsStore, FieldValidator, RuleOptions};
use regex::{Regex, RegexSet};
use serde_json::Value;
use std::sync::LazyLock;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

/// Character classes a password must each contain at least once.
static PASSWORD_CLASSES: LazyLock<RegexSet> = LazyLock::new(|| {
    RegexSet::new([r"[a-z]", r"[A-Z]", r"[0-9]"]).expect("password class patterns are valid")
});

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn is_required_failed(value: &Value, _object: &Value, _options: &RuleOptions) -> bool {
    is_blank(value)
}

fn length_failed(value: &Value, _object: &Value, options: &RuleOptions) -> bool {
    let min = match options.param("length").and_then(Value::as_u64) {
        Some(min) => usize::try_from(min).unwrap_or(usize::MAX),
        None => return false,
    };

    match value {
        Value::String(s) if !s.is_empty() => s.chars().count() < min,
        Value::Array(items) if !items.is_empty() => items.len() < min,
        _ => false,
    }
}

fn match_failed(value: &Value, object: &Value, options: &RuleOptions) -> bool {
    match options.param("field").and_then(Value::as_str) {
        Some(field) => object.get(field).unwrap_or(&Value::Null) != value,
        None => false,
    }
}

fn email_failed(value: &Value, _object: &Value, _options: &RuleOptions) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty() && !EMAIL_REGEX.is_match(s),
        _ => true,
    }
}

fn is_number_failed(value: &Value, _object: &Value, _options: &RuleOptions) -> bool {
    match value {
        Value::Null | Value::Number(_) => false,
        Value::String(s) if s.trim().is_empty() => false,
        Value::String(s) => !s.trim().parse::<f64>().map_or(false, f64::is_finite),
        _ => true,
    }
}

impl DefaultsStore {
    /// See [is_required].
    pub fn is_required<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        self.named_validation(names::IS_REQUIRED)
            .rule(is_required_failed)
            .build(options)
    }

    /// See [length].
    pub fn length<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        let options = options.into();
        if options.param("length").and_then(Value::as_u64).is_none() {
            tracing::warn!("length rule built without a numeric `length` option, it will never fail");
        }
        self.named_validation(names::LENGTH)
            .rule(length_failed)
            .build(options)
    }

    /// See [password_complexity].
    pub fn password_complexity<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        let options = options.into();
        let pattern = match options.param("pattern").and_then(Value::as_str) {
            Some(pattern) => match Regex::new(pattern) {
                Ok(pattern) => Some(pattern),
                Err(error) => {
                    tracing::warn!(%error, "invalid password pattern, using the default complexity check");
                    None
                }
            },
            None => None,
        };

        self.named_validation(names::PASSWORD_COMPLEXITY)
            .rule(move |value, _object, _options| match value.as_str() {
                Some(s) if !s.is_empty() => match &pattern {
                    Some(pattern) => !pattern.is_match(s),
                    None => !PASSWORD_CLASSES.matches(s).matched_all(),
                },
                _ => false,
            })
            .build(options)
    }

    /// See [match_field].
    pub fn match_field<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        let options = options.into();
        if options.param("field").and_then(Value::as_str).is_none() {
            tracing::warn!("match rule built without a `field` option, it will never fail");
        }
        self.named_validation(names::MATCH)
            .rule(match_failed)
            .build(options)
    }

    /// See [email].
    pub fn email<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        self.named_validation(names::EMAIL)
            .rule(email_failed)
            .build(options)
    }

    /// See [is_number].
    pub fn is_number<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        self.named_validation(names::IS_NUMBER)
            .rule(is_number_failed)
            .build(options)
    }
}

/// Fails when the value is `null`/missing, an empty string or an empty
/// list.
pub fn is_required<O: Into<RuleOptions>>(options: O) -> FieldValidator {
    DefaultsStore::global().is_required(options)
}

/// Fails when a string (counted in characters) or list is shorter than
/// the `length` option.
pub fn length<O: Into<RuleOptions>>(options: O) -> FieldValidator {
    DefaultsStore::global().length(options)
}

/// Fails unless the string contains a lowercase letter, an uppercase
/// letter and a digit. A `pattern` option replaces this with a regular
/// expression the string must match.
pub fn password_complexity<O: Into<RuleOptions>>(options: O) -> FieldValidator {
    DefaultsStore::global().password_complexity(options)
}

/// Fails when the value differs from the object's field named by the
/// `field` option.
pub fn match_field<O: Into<RuleOptions>>(options: O) -> FieldValidator {
    DefaultsStore::global().match_field(options)
}

/// Fails when the value is not an email address.
pub fn email<O: Into<RuleOptions>>(options: O) -> FieldValidator {
    DefaultsStore::global().email(options)
}

/// Fails when the value is neither a number nor a string holding one.
pub fn is_number<O: Into<RuleOptions>>(options: O) -> FieldValidator {
    DefaultsStore::global().is_number(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultsPatch;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    fn check(validator: &FieldValidator, value: Value) -> Option<String> {
        validator.check(&value, &json!({}))
    }

    #[rstest]
    #[case(json!(null), true)]
    #[case(json!(""), true)]
    #[case(json!([]), true)]
    #[case(json!(" "), false)]
    #[case(json!(0), false)]
    #[case(json!(false), false)]
    #[case(json!("x"), false)]
    fn required(#[case] value: Value, #[case] fails: bool) {
        let store = DefaultsStore::new();
        let result = check(&store.is_required(()), value);
        assert_eq!(fails, result.is_some());
    }

    #[rstest]
    #[case(json!("bethesda"), None)]
    #[case(json!("bob"), Some("has to be at least 6 characters long"))]
    #[case(json!("ÅÄÖåäö"), None)]
    #[case(json!(""), None)]
    #[case(json!(null), None)]
    #[case(json!([1, 2]), Some("has to be at least 6 characters long"))]
    fn length_of_values(#[case] value: Value, #[case] expected: Option<&str>) {
        let store = DefaultsStore::new();
        let v = store.length(json!({ "length": 6 }));
        assert_eq!(expected.map(str::to_string), check(&v, value));
    }

    #[test]
    fn huge_length_option_saturates() {
        let store = DefaultsStore::new();
        let v = store.length(json!({ "length": u64::MAX }));
        assert!(check(&v, json!("long enough for anything small")).is_some());
    }

    #[test]
    fn length_without_option_never_fails() {
        let store = DefaultsStore::new();
        assert_eq!(None, check(&store.length(()), json!("a")));
    }

    #[rstest]
    #[case("Passw0rd", false)]
    #[case("password", true)]
    #[case("PASSWORD1", true)]
    #[case("Password", true)]
    #[case("test", true)]
    #[case("", false)]
    fn default_password_complexity(#[case] password: &str, #[case] fails: bool) {
        let store = DefaultsStore::new();
        let result = check(&store.password_complexity(()), json!(password));
        assert_eq!(fails, result.is_some());
    }

    #[test]
    fn password_pattern_option() {
        let store = DefaultsStore::new();
        let v = store.password_complexity(json!({ "pattern": "^.{12,}$", "message": "too weak" }));
        assert_eq!(Some("too weak".to_string()), check(&v, json!("Sh0rt")));
        assert_eq!(None, check(&v, json!("longenoughpassphrase")));
    }

    #[test]
    fn invalid_password_pattern_falls_back() {
        let store = DefaultsStore::new();
        let v = store.password_complexity(json!({ "pattern": "(" }));
        assert!(check(&v, json!("weak")).is_some());
        assert_eq!(None, check(&v, json!("Str0ng")));
    }

    #[test]
    fn match_compares_with_other_field() {
        let store = DefaultsStore::new();
        let v = store.match_field(json!({ "field": "password" }));
        let object = json!({ "password": "Secret1" });

        assert_eq!(None, v.check(&json!("Secret1"), &object));
        assert_eq!(
            Some("does not match password".to_string()),
            v.check(&json!("Secret2"), &object)
        );
    }

    #[rstest]
    #[case(json!("user@example.com"), false)]
    #[case(json!("first.last+tag@sub.example.org"), false)]
    #[case(json!("not an email"), true)]
    #[case(json!("missing@"), true)]
    #[case(json!(""), false)]
    #[case(json!(null), false)]
    #[case(json!(42), true)]
    fn email_addresses(#[case] value: Value, #[case] fails: bool) {
        let store = DefaultsStore::new();
        assert_eq!(fails, check(&store.email(()), value).is_some());
    }

    #[rstest]
    #[case(json!(3), false)]
    #[case(json!(-2.5), false)]
    #[case(json!("12"), false)]
    #[case(json!(" 1.5e3 "), false)]
    #[case(json!(""), false)]
    #[case(json!(null), false)]
    #[case(json!("twelve"), true)]
    #[case(json!("NaN"), true)]
    #[case(json!(true), true)]
    fn numbers(#[case] value: Value, #[case] fails: bool) {
        let store = DefaultsStore::new();
        assert_eq!(fails, check(&store.is_number(()), value).is_some());
    }

    #[test]
    fn message_override_wins() {
        let store = DefaultsStore::new();
        let v = store.is_number(json!({ "message": "X" }));
        assert_eq!(Some("X".to_string()), check(&v, json!("abc")));
    }

    #[test]
    fn rules_capture_defaults_when_built() {
        let store = DefaultsStore::new();
        let before = store.is_required(());
        store.set_defaults(DefaultsPatch::new().message(names::IS_REQUIRED, "i require you to show up!"));
        let after = store.is_required(());

        assert_eq!(Some("is required".to_string()), check(&before, Value::Null));
        assert_eq!(
            Some("i require you to show up!".to_string()),
            check(&after, Value::Null)
        );
    }
}
