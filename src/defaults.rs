use crate::{template_transform, Error, MessageTransform};
use parking_lot::RwLock;
use serde::Deserialize;
use std::{
    collections::HashMap,
    sync::{Arc, LazyLock},
};

/// Message used by rules that have no registered default message.
pub const GENERIC_MESSAGE: &str = "This field is invalid!";

/// Names under which the built-in rules register their default
/// messages.
pub mod names {
    pub const IS_REQUIRED: &str = "isRequired";
    pub const LENGTH: &str = "length";
    pub const PASSWORD_COMPLEXITY: &str = "passwordComplexity";
    pub const MATCH: &str = "match";
    pub const EMAIL: &str = "email";
    pub const IS_NUMBER: &str = "isNumber";
}

/// Default messages and message transforms consulted when rules are
/// constructed.
#[derive(Debug, Clone)]
pub struct Defaults {
    /// Applied right-to-left to every resolved message.
    pub message_transforms: Vec<MessageTransform>,
    /// Default message per rule name.
    pub messages: HashMap<String, String>,
}

impl Defaults {
    /// The built-in messages, with `{{token}}` templating as the only
    /// transform.
    pub fn builtin() -> Self {
        let messages = [
            (names::IS_REQUIRED, "is required"),
            (names::LENGTH, "has to be at least {{length}} characters long"),
            (
                names::PASSWORD_COMPLEXITY,
                "must contain at least one lowercase letter, one uppercase letter and one number",
            ),
            (names::MATCH, "does not match {{field}}"),
            (names::EMAIL, "is not a valid email address"),
            (names::IS_NUMBER, "has to be a number"),
        ]
        .iter()
        .map(|(name, message)| (name.to_string(), message.to_string()))
        .collect();

        Self {
            message_transforms: vec![template_transform()],
            messages,
        }
    }

    /// The default message registered under `name`, or
    /// [GENERIC_MESSAGE] when there is none.
    pub fn message(&self, name: &str) -> &str {
        self.messages
            .get(name)
            .map(String::as_str)
            .unwrap_or(GENERIC_MESSAGE)
    }

    fn apply(&mut self, patch: DefaultsPatch) {
        if let Some(message_transforms) = patch.message_transforms {
            self.message_transforms = message_transforms;
        }
        self.messages.extend(patch.messages);
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults::builtin()
    }
}

/// A partial update to [Defaults].
///
/// Transforms, when present, replace the existing pipeline. Messages
/// are merged into the existing map one key at a time.
///
/// Only the `messages` part can be read from configuration; the
/// transforms are code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DefaultsPatch {
    #[serde(skip)]
    pub message_transforms: Option<Vec<MessageTransform>>,
    #[serde(default)]
    pub messages: HashMap<String, String>,
}

impl DefaultsPatch {
    /// Create an empty `DefaultsPatch`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a patch from a JSON document such as
    /// `{ "messages": { "isRequired": "cannot be blank" } }`.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(Error::Defaults)
    }

    /// Factory method to override the default message of one rule.
    pub fn message<N: Into<String>, M: Into<String>>(mut self, name: N, message: M) -> Self {
        self.messages.insert(name.into(), message.into());
        self
    }

    /// Factory method to replace the transform pipeline.
    pub fn message_transforms(mut self, message_transforms: Vec<MessageTransform>) -> Self {
        self.message_transforms = Some(message_transforms);
        self
    }
}

static GLOBAL_DEFAULTS: LazyLock<DefaultsStore> = LazyLock::new(DefaultsStore::new);

/// A shared handle to a set of [Defaults].
///
/// Clones refer to the same underlying defaults. Rules built through a
/// store read from it either when they are constructed (the built-in
/// rules, [create_validation](crate::create_validation)) or every time
/// they fail ([transform_validator](crate::transform_validator)).
#[derive(Debug, Clone)]
pub struct DefaultsStore {
    defaults: Arc<RwLock<Defaults>>,
}

impl DefaultsStore {
    /// Create a new store holding the [built-in](Defaults::builtin)
    /// defaults, independent of the process-wide one.
    pub fn new() -> Self {
        Self::with_defaults(Defaults::builtin())
    }

    /// Create a new store holding the given defaults.
    pub fn with_defaults(defaults: Defaults) -> Self {
        Self {
            defaults: Arc::new(RwLock::new(defaults)),
        }
    }

    /// The process-wide store used by the free functions of this
    /// crate.
    pub fn global() -> Self {
        GLOBAL_DEFAULTS.clone()
    }

    /// A snapshot of the current defaults.
    pub fn current_defaults(&self) -> Defaults {
        self.defaults.read().clone()
    }

    /// The current default message registered under `name`.
    pub fn message(&self, name: &str) -> String {
        self.defaults.read().message(name).to_string()
    }

    /// The current transform pipeline.
    pub fn message_transforms(&self) -> Vec<MessageTransform> {
        self.defaults.read().message_transforms.clone()
    }

    /// Apply a partial update. Rules that already captured their
    /// defaults are unaffected.
    pub fn set_defaults(&self, patch: DefaultsPatch) {
        tracing::debug!(
            replaces_transforms = patch.message_transforms.is_some(),
            messages = patch.messages.len(),
            "updating validation defaults"
        );
        self.defaults.write().apply(patch);
    }

    /// Restore the built-in defaults.
    pub fn reset(&self) {
        *self.defaults.write() = Defaults::builtin();
    }
}

impl Default for DefaultsStore {
    fn default() -> Self {
        DefaultsStore::new()
    }
}

/// Apply a partial update to the process-wide defaults.
///
/// ## Example
/// ```
/// use object_validation::{current_defaults, set_defaults, DefaultsPatch};
///
/// set_defaults(DefaultsPatch::new().message("isNumber", "numbers only"));
/// assert_eq!("numbers only", current_defaults().message("isNumber"));
/// ```
pub fn set_defaults(patch: DefaultsPatch) {
    GLOBAL_DEFAULTS.set_defaults(patch)
}

/// A snapshot of the process-wide defaults.
pub fn current_defaults() -> Defaults {
    GLOBAL_DEFAULTS.current_defaults()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleOptions;
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_messages() {
        let defaults = Defaults::builtin();
        assert_eq!("is required", defaults.message(names::IS_REQUIRED));
        assert_eq!(
            "has to be at least {{length}} characters long",
            defaults.message(names::LENGTH)
        );
        assert_eq!(GENERIC_MESSAGE, defaults.message("unknownRule"));
        assert_eq!(1, defaults.message_transforms.len());
    }

    #[test]
    fn messages_merge_key_by_key() {
        let store = DefaultsStore::new();
        store.set_defaults(DefaultsPatch::new().message(names::IS_REQUIRED, "show up"));

        assert_eq!("show up", store.message(names::IS_REQUIRED));
        assert_eq!("has to be a number", store.message(names::IS_NUMBER));
    }

    #[test]
    fn transforms_are_replaced_wholesale() {
        let store = DefaultsStore::new();
        store.set_defaults(DefaultsPatch::new().message_transforms(vec![
            MessageTransform::new(|message, _| message.to_uppercase()),
            MessageTransform::new(|message, _| format!("{}!", message)),
        ]));

        let transforms = store.message_transforms();
        assert_eq!(2, transforms.len());
        assert_eq!(
            "HI!",
            crate::apply_transforms(&transforms, "hi".to_string(), &RuleOptions::Absent)
        );
    }

    #[test]
    fn patch_without_transforms_keeps_pipeline() {
        let store = DefaultsStore::new();
        store.set_defaults(DefaultsPatch::new().message("email", "bad email"));
        assert_eq!(1, store.message_transforms().len());
    }

    #[test]
    fn clones_share_defaults() {
        let store = DefaultsStore::new();
        let handle = store.clone();
        handle.set_defaults(DefaultsPatch::new().message("custom", "custom message"));
        assert_eq!("custom message", store.message("custom"));

        store.reset();
        assert_eq!(GENERIC_MESSAGE, handle.message("custom"));
    }

    #[test]
    fn snapshot_is_detached() {
        let store = DefaultsStore::new();
        let snapshot = store.current_defaults();
        store.set_defaults(DefaultsPatch::new().message(names::MATCH, "different"));
        assert_eq!("does not match {{field}}", snapshot.message(names::MATCH));
    }

    #[test]
    fn patch_from_json() {
        let patch =
            DefaultsPatch::from_json(r#"{ "messages": { "isRequired": "cannot be blank" } }"#)
                .unwrap();
        assert!(patch.message_transforms.is_none());
        assert_eq!(
            Some(&"cannot be blank".to_string()),
            patch.messages.get(names::IS_REQUIRED)
        );
    }

    #[test]
    fn patch_from_invalid_json() {
        let error = DefaultsPatch::from_json(r#"{ "messageTransforms": [] }"#).unwrap_err();
        assert!(matches!(error, Error::Defaults(_)));
    }
}
