use crate::{
    resolve_message, DefaultsStore, FieldValidator, MessageTransform, RuleOptions,
    GENERIC_MESSAGE,
};
use serde_json::Value;
use std::{fmt::Debug, rc::Rc};

type PredicateTraitObject = dyn Fn(&Value, &Value, &RuleOptions) -> bool;
type SimplePredicateTraitObject = dyn Fn(&Value, &[Value]) -> bool;

/// Builds rule factories sharing a default message and a transform
/// pipeline. See [create_validation].
#[derive(Debug, Clone)]
pub struct ValidationFactory {
    default_message: Rc<str>,
    message_transforms: Rc<[MessageTransform]>,
}

impl ValidationFactory {
    /// Create a new `ValidationFactory`.
    pub fn new<S: Into<String>>(
        default_message: S,
        message_transforms: Vec<MessageTransform>,
    ) -> Self {
        Self {
            default_message: Rc::from(default_message.into()),
            message_transforms: Rc::from(message_transforms),
        }
    }

    /// Turn a failure predicate into a [RuleFactory]. The predicate
    /// receives the field value, the whole object and the rule options,
    /// and returns `true` when the value is invalid.
    pub fn rule<P>(&self, failure_predicate: P) -> RuleFactory
    where
        P: Fn(&Value, &Value, &RuleOptions) -> bool + 'static,
    {
        RuleFactory {
            default_message: Rc::clone(&self.default_message),
            message_transforms: Rc::clone(&self.message_transforms),
            failure_predicate: Rc::new(failure_predicate),
        }
    }
}

/// A reusable rule: each call to [build](RuleFactory::build) with a
/// set of options yields a [FieldValidator].
#[derive(Clone)]
pub struct RuleFactory {
    default_message: Rc<str>,
    message_transforms: Rc<[MessageTransform]>,
    failure_predicate: Rc<PredicateTraitObject>,
}

impl RuleFactory {
    /// Create a [FieldValidator] for the given options. The options
    /// are handed to the predicate on every check, and decide the
    /// failure message.
    pub fn build<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        let options = options.into();
        let default_message = Rc::clone(&self.default_message);
        let message_transforms = Rc::clone(&self.message_transforms);
        let failure_predicate = Rc::clone(&self.failure_predicate);

        FieldValidator::new(move |value, object| {
            if failure_predicate(value, object, &options) {
                Some(resolve_message(
                    &default_message,
                    &options,
                    &message_transforms,
                ))
            } else {
                None
            }
        })
    }

    /// The message used when options carry no override.
    pub fn default_message(&self) -> &str {
        &self.default_message
    }
}

impl Debug for RuleFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RuleFactory(default_message: {:?}, message_transforms: {}, failure_predicate: {:p})",
            self.default_message,
            self.message_transforms.len(),
            self.failure_predicate
        )
    }
}

/// Create a [ValidationFactory] with a fixed default message.
///
/// `message_transforms` of `None` captures the current process-wide
/// pipeline; later calls to [set_defaults](crate::set_defaults) do not
/// affect the returned factory.
///
/// ## Example
/// ```
/// use object_validation::{create_validation, template_transform, RuleOptions};
/// use serde_json::{json, Value};
///
/// let at_most = create_validation("cannot exceed {{max}}", Some(vec![template_transform()]))
///     .rule(|value: &Value, _object: &Value, options: &RuleOptions| {
///         match (value.as_i64(), options.param("max").and_then(Value::as_i64)) {
///             (Some(value), Some(max)) => value > max,
///             _ => false,
///         }
///     });
///
/// let v = at_most.build(json!({ "max": 10 }));
/// assert_eq!(None, v.check(&json!(3), &json!({})));
/// assert_eq!(Some("cannot exceed 10".to_string()), v.check(&json!(11), &json!({})));
///
/// let v = at_most.build(json!({ "max": 10, "message": "too many" }));
/// assert_eq!(Some("too many".to_string()), v.check(&json!(11), &json!({})));
/// ```
pub fn create_validation<S: Into<String>>(
    default_message: S,
    message_transforms: Option<Vec<MessageTransform>>,
) -> ValidationFactory {
    let message_transforms =
        message_transforms.unwrap_or_else(|| DefaultsStore::global().message_transforms());
    ValidationFactory::new(default_message, message_transforms)
}

/// A one-off rule with the generic default message and the current
/// process-wide pipeline. Build it with the message to report.
///
/// ## Example
/// ```
/// use object_validation::{with_validation, RuleOptions};
/// use serde_json::{json, Value};
///
/// let not_admin = with_validation(|value: &Value, _: &Value, _: &RuleOptions| value == "admin")
///     .build("admin is reserved");
/// assert_eq!(Some("admin is reserved".to_string()), not_admin.check(&json!("admin"), &json!({})));
/// ```
pub fn with_validation<P>(failure_predicate: P) -> RuleFactory
where
    P: Fn(&Value, &Value, &RuleOptions) -> bool + 'static,
{
    DefaultsStore::global().with_validation(failure_predicate)
}

/// Adapt a predicate of the `(value, args...) -> is valid` shape into
/// a rule. See [TransformedRule].
pub fn transform_validator<N, P>(name: N, simple_predicate: P) -> TransformedRule
where
    N: Into<String>,
    P: Fn(&Value, &[Value]) -> bool + 'static,
{
    DefaultsStore::global().transform_validator(name, simple_predicate)
}

impl DefaultsStore {
    /// A [ValidationFactory] capturing this store's current pipeline.
    pub fn create_validation<S: Into<String>>(&self, default_message: S) -> ValidationFactory {
        ValidationFactory::new(default_message, self.message_transforms())
    }

    /// A [ValidationFactory] capturing this store's current message
    /// for the rule `name` and its current pipeline.
    pub fn named_validation(&self, name: &str) -> ValidationFactory {
        let defaults = self.current_defaults();
        let default_message = defaults.message(name).to_string();
        ValidationFactory::new(default_message, defaults.message_transforms)
    }

    /// See [with_validation].
    pub fn with_validation<P>(&self, failure_predicate: P) -> RuleFactory
    where
        P: Fn(&Value, &Value, &RuleOptions) -> bool + 'static,
    {
        self.create_validation(GENERIC_MESSAGE).rule(failure_predicate)
    }

    /// See [transform_validator].
    pub fn transform_validator<N, P>(&self, name: N, simple_predicate: P) -> TransformedRule
    where
        N: Into<String>,
        P: Fn(&Value, &[Value]) -> bool + 'static,
    {
        TransformedRule {
            name: Rc::from(name.into()),
            simple_predicate: Rc::new(simple_predicate),
            store: self.clone(),
        }
    }
}

/// A rule adapted from a predicate that returns `true` for *valid*
/// values.
///
/// The options may list `nativeParams`, the names of option
/// parameters whose values are passed to the predicate positionally
/// after the field value. Without `nativeParams`, the remaining
/// parameters are passed as a single object argument, and no
/// arguments at all when there are none.
///
/// The default message and the transform pipeline are read from the
/// store, under the rule's name, each time a check fails.
///
/// ## Example
/// ```
/// use object_validation::{DefaultsPatch, DefaultsStore};
/// use serde_json::{json, Value};
///
/// let store = DefaultsStore::new();
/// let is_in = store.transform_validator("isIn", |value: &Value, args: &[Value]| {
///     args.first()
///         .and_then(Value::as_array)
///         .map_or(false, |allowed| allowed.contains(value))
/// });
///
/// let v = is_in.build(json!({ "allowed": ["a", "b"], "nativeParams": ["allowed"] }));
/// store.set_defaults(DefaultsPatch::new().message("isIn", "is not allowed"));
///
/// assert_eq!(None, v.check(&json!("a"), &json!({})));
/// assert_eq!(Some("is not allowed".to_string()), v.check(&json!("c"), &json!({})));
/// ```
#[derive(Clone)]
pub struct TransformedRule {
    name: Rc<str>,
    simple_predicate: Rc<SimplePredicateTraitObject>,
    store: DefaultsStore,
}

impl TransformedRule {
    /// Create a [FieldValidator] for the given options.
    pub fn build<O: Into<RuleOptions>>(&self, options: O) -> FieldValidator {
        let options = options.into();
        let native_args = native_args(&options);
        let name = Rc::clone(&self.name);
        let simple_predicate = Rc::clone(&self.simple_predicate);
        let store = self.store.clone();

        FieldValidator::new(move |value, _object| {
            if simple_predicate(value, &native_args) {
                return None;
            }
            let default_message = store.message(&name);
            let message_transforms = store.message_transforms();
            Some(resolve_message(
                &default_message,
                &options,
                &message_transforms,
            ))
        })
    }

    /// The name the default message is looked up by.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Debug for TransformedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TransformedRule(name: {:?}, simple_predicate: {:p})",
            self.name, self.simple_predicate
        )
    }
}

const NATIVE_PARAMS: &str = "nativeParams";

fn native_args(options: &RuleOptions) -> Vec<Value> {
    let params = match options.params() {
        Some(params) => params,
        None => return Vec::new(),
    };

    match params.get(NATIVE_PARAMS) {
        Some(Value::Array(keys)) => keys
            .iter()
            .filter_map(|key| match key {
                Value::String(key) => Some(params.get(key).cloned().unwrap_or(Value::Null)),
                other => {
                    tracing::warn!(key = %other, "ignoring native parameter name that is not a string");
                    None
                }
            })
            .collect(),
        Some(other) => {
            tracing::warn!(native_params = %other, "nativeParams must be a list of option names");
            Vec::new()
        }
        None if params.is_empty() => Vec::new(),
        None => vec![Value::Object(params.clone())],
    }
}
