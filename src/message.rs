use regex::Regex;
use serde_json::{Map, Value};
use std::{
    fmt::Debug,
    sync::{Arc, LazyLock},
};

/// Matches a `{{name}}` placeholder in a message template.
static TEMPLATE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("template token pattern is valid"));

/// The options a rule was constructed with.
///
/// Rules accept either nothing, a bare custom message, or a set of
/// named parameters which may carry a `message` override.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RuleOptions {
    /// No options were supplied.
    #[default]
    Absent,
    /// Shorthand form: the string replaces the default message.
    CustomMessage(String),
    /// Parameters with an explicit `message` override.
    WithMessage {
        message: String,
        params: Map<String, Value>,
    },
    /// Parameters without a message override.
    Params(Map<String, Value>),
}

impl RuleOptions {
    /// Interpret a JSON value as rule options.
    ///
    /// `null` is [Absent](RuleOptions::Absent), a string is a
    /// [CustomMessage](RuleOptions::CustomMessage), an object with a
    /// string `message` field is
    /// [WithMessage](RuleOptions::WithMessage) and any other object
    /// is [Params](RuleOptions::Params). Scalars other than strings
    /// carry no meaning and are treated as absent.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => RuleOptions::Absent,
            Value::String(message) => RuleOptions::CustomMessage(message),
            Value::Object(mut params) => match params.remove("message") {
                Some(Value::String(message)) => RuleOptions::WithMessage { message, params },
                Some(other) => {
                    params.insert("message".to_string(), other);
                    RuleOptions::Params(params)
                }
                None => RuleOptions::Params(params),
            },
            other => {
                tracing::warn!(options = %other, "ignoring rule options that are not a string or an object");
                RuleOptions::Absent
            }
        }
    }

    /// The message override carried by these options, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            RuleOptions::CustomMessage(message) | RuleOptions::WithMessage { message, .. } => {
                Some(message.as_str())
            }
            RuleOptions::Absent | RuleOptions::Params(_) => None,
        }
    }

    /// The named parameters, if these options carry any.
    pub fn params(&self) -> Option<&Map<String, Value>> {
        match self {
            RuleOptions::WithMessage { params, .. } | RuleOptions::Params(params) => Some(params),
            RuleOptions::Absent | RuleOptions::CustomMessage(_) => None,
        }
    }

    /// Look up a single named parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params().and_then(|params| params.get(name))
    }

    /// Factory method to add a named parameter, keeping any message
    /// override already present.
    pub fn with_param<K: Into<String>, V: Into<Value>>(self, name: K, value: V) -> Self {
        let (message, mut params) = match self {
            RuleOptions::Absent => (None, Map::new()),
            RuleOptions::CustomMessage(message) => (Some(message), Map::new()),
            RuleOptions::WithMessage { message, params } => (Some(message), params),
            RuleOptions::Params(params) => (None, params),
        };
        params.insert(name.into(), value.into());

        match message {
            Some(message) => RuleOptions::WithMessage { message, params },
            None => RuleOptions::Params(params),
        }
    }

    /// Factory method to set the message override, keeping any
    /// parameters already present.
    pub fn with_message<S: Into<String>>(self, message: S) -> Self {
        match self {
            RuleOptions::Absent | RuleOptions::CustomMessage(_) => {
                RuleOptions::CustomMessage(message.into())
            }
            RuleOptions::WithMessage { params, .. } | RuleOptions::Params(params) => {
                RuleOptions::WithMessage {
                    message: message.into(),
                    params,
                }
            }
        }
    }
}

impl From<()> for RuleOptions {
    fn from(_: ()) -> Self {
        RuleOptions::Absent
    }
}

impl From<&str> for RuleOptions {
    fn from(message: &str) -> Self {
        RuleOptions::CustomMessage(message.to_string())
    }
}

impl From<String> for RuleOptions {
    fn from(message: String) -> Self {
        RuleOptions::CustomMessage(message)
    }
}

impl From<Value> for RuleOptions {
    fn from(value: Value) -> Self {
        RuleOptions::from_json(value)
    }
}

impl From<Map<String, Value>> for RuleOptions {
    fn from(params: Map<String, Value>) -> Self {
        RuleOptions::from_json(Value::Object(params))
    }
}

type MessageTransformTraitObject = dyn Fn(&str, &RuleOptions) -> String + Send + Sync;

/// Rewrites a resolved failure message, given the options of the
/// rule that failed. Used for templating and localization.
///
/// ## Example
/// ```
/// use object_validation::{MessageTransform, RuleOptions};
///
/// let shout = MessageTransform::new(|message, _options| message.to_uppercase());
/// assert_eq!("IS REQUIRED", shout.apply("is required", &RuleOptions::Absent));
/// ```
#[derive(Clone)]
pub struct MessageTransform {
    transform: Arc<MessageTransformTraitObject>,
}

impl MessageTransform {
    /// Create a new `MessageTransform`.
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(&str, &RuleOptions) -> String + Send + Sync + 'static,
    {
        Self {
            transform: Arc::new(transform),
        }
    }

    /// Run this transform over a message.
    pub fn apply(&self, message: &str, options: &RuleOptions) -> String {
        (self.transform)(message, options)
    }
}

impl Debug for MessageTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MessageTransform({:p})", self.transform)
    }
}

/// The built-in transform, substituting the first `{{name}}`
/// placeholder with the rule parameter `name`.
///
/// Only the first placeholder is considered. When the parameter is
/// missing the message is returned unchanged.
pub fn template_transform() -> MessageTransform {
    MessageTransform::new(substitute_first_token)
}

fn substitute_first_token(message: &str, options: &RuleOptions) -> String {
    let captures = match TEMPLATE_TOKEN.captures(message) {
        Some(captures) => captures,
        None => return message.to_string(),
    };
    let (token, name) = match (captures.get(0), captures.get(1)) {
        (Some(token), Some(name)) => (token, name),
        _ => return message.to_string(),
    };

    match options.param(name.as_str()) {
        Some(value) => {
            let mut substituted = String::with_capacity(message.len());
            substituted.push_str(&message[..token.start()]);
            substituted.push_str(&render_param(value));
            substituted.push_str(&message[token.end()..]);
            substituted
        }
        None => message.to_string(),
    }
}

fn render_param(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Apply a transform pipeline to a message. The rightmost transform
/// runs first; an empty pipeline leaves the message untouched.
pub fn apply_transforms(
    message_transforms: &[MessageTransform],
    message: String,
    options: &RuleOptions,
) -> String {
    message_transforms
        .iter()
        .rev()
        .fold(message, |message, transform| transform.apply(&message, options))
}

/// Produce the message surfaced for a failed check.
///
/// A message override in `options` takes precedence over
/// `default_message`, and the result is then passed through
/// `message_transforms`.
///
/// ## Example
/// ```
/// use object_validation::{resolve_message, template_transform, RuleOptions};
/// use serde_json::json;
///
/// let transforms = vec![template_transform()];
/// let options = RuleOptions::from_json(json!({ "length": 6 }));
/// assert_eq!(
///     "has to be at least 6 characters long",
///     resolve_message("has to be at least {{length}} characters long", &options, &transforms)
/// );
/// assert_eq!(
///     "too short",
///     resolve_message("has to be at least {{length}} characters long", &"too short".into(), &transforms)
/// );
/// ```
pub fn resolve_message(
    default_message: &str,
    options: &RuleOptions,
    message_transforms: &[MessageTransform],
) -> String {
    let message = options.message().unwrap_or(default_message).to_string();
    apply_transforms(message_transforms, message, options)
}
