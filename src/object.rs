use crate::{FieldOutcome, FieldValidator, Validation, ValidationResult, Validator};
use indexmap::IndexMap;
use serde_json::Value;
use std::{fmt::Debug, rc::Rc};

static MISSING: Value = Value::Null;

/// One entry of a [RuleTree].
#[derive(Clone)]
pub enum RuleNode {
    /// Checks run against the field value.
    Leaf(Rc<dyn Validation>),
    /// Rules for the fields of a nested object.
    Nested(RuleTree),
    /// The field value is copied into the result unchecked.
    Passthrough,
}

impl RuleNode {
    /// Wrap any [Validation] as a leaf.
    pub fn leaf<V: Validation + 'static>(validation: V) -> Self {
        RuleNode::Leaf(Rc::new(validation))
    }
}

impl Debug for RuleNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleNode::Leaf(validation) => write!(f, "Leaf({:p})", Rc::as_ptr(validation)),
            RuleNode::Nested(tree) => f.debug_tuple("Nested").field(tree).finish(),
            RuleNode::Passthrough => write!(f, "Passthrough"),
        }
    }
}

impl From<Validator> for RuleNode {
    fn from(validator: Validator) -> Self {
        RuleNode::leaf(validator)
    }
}

impl From<FieldValidator> for RuleNode {
    fn from(validator_fn: FieldValidator) -> Self {
        RuleNode::leaf(validator_fn)
    }
}

impl From<RuleTree> for RuleNode {
    fn from(tree: RuleTree) -> Self {
        RuleNode::Nested(tree)
    }
}

/// Declares, per field name, how that field of an object is
/// validated. Fields are visited in declaration order.
#[derive(Debug, Clone, Default)]
pub struct RuleTree {
    entries: IndexMap<String, RuleNode>,
}

impl RuleTree {
    /// Create an empty `RuleTree`.
    pub fn new() -> Self {
        Self::default()
    }

    /// A factory method to declare the rules for a field. A
    /// [Validator], a single [FieldValidator] or a nested `RuleTree`
    /// all convert into a [RuleNode].
    pub fn field<S: Into<String>, N: Into<RuleNode>>(mut self, name: S, node: N) -> Self {
        self.insert(name, node);
        self
    }

    /// A factory method to declare a field that is copied into the
    /// result without being checked.
    pub fn passthrough<S: Into<String>>(mut self, name: S) -> Self {
        self.insert(name, RuleNode::Passthrough);
        self
    }

    /// Declare the rules for a field, replacing any earlier
    /// declaration while keeping its position.
    pub fn insert<S: Into<String>, N: Into<RuleNode>>(&mut self, name: S, node: N) {
        self.entries.insert(name.into(), node.into());
    }

    /// The rules declared for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&RuleNode> {
        self.entries.get(name)
    }

    /// The number of declared fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the declared fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleNode)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }
}

impl<S: Into<String>> FromIterator<(S, RuleNode)> for RuleTree {
    fn from_iter<I: IntoIterator<Item = (S, RuleNode)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        }
    }
}

/// Which object nested rules see as the whole-object context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NestedContext {
    /// The top-level object being validated.
    #[default]
    Root,
    /// The nested object the field belongs to.
    Parent,
}

/// Validates whole objects against a [RuleTree].
///
/// ## Example
/// ```
/// use object_validation::{is_required, length, v, validate, RuleTree};
/// use serde_json::json;
///
/// let validator = validate(
///     RuleTree::new()
///         .field("username", v![is_required(()), length(json!({ "length": 6 }))])
///         .field("address", RuleTree::new().field("city", v![is_required(())])),
/// );
///
/// let result = validator.validate(&json!({ "username": "bob", "address": {} }));
/// assert_eq!(
///     json!({
///         "username": ["has to be at least 6 characters long"],
///         "address": { "city": ["is required"] },
///     }),
///     result.to_json()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ObjectValidator {
    tree: RuleTree,
    nested_context: NestedContext,
}

impl ObjectValidator {
    /// Create a new `ObjectValidator`.
    pub fn new(tree: RuleTree) -> Self {
        Self {
            tree,
            nested_context: NestedContext::default(),
        }
    }

    /// Factory method to choose the context handed to nested rules.
    pub fn with_nested_context(mut self, nested_context: NestedContext) -> Self {
        self.nested_context = nested_context;
        self
    }

    /// The rules this validator applies.
    pub fn tree(&self) -> &RuleTree {
        &self.tree
    }

    /// Validate `object`, returning only the fields that failed.
    ///
    /// The rule tree drives iteration: fields of `object` without
    /// rules are ignored, and declared fields missing from `object`
    /// are checked as `null`.
    pub fn validate(&self, object: &Value) -> ValidationResult {
        let result = self.validate_tree(&self.tree, object, object);
        tracing::trace!(failed_fields = result.len(), "validated object");
        result
    }

    fn validate_tree(&self, tree: &RuleTree, object: &Value, context: &Value) -> ValidationResult {
        let mut result = ValidationResult::new();

        for (name, node) in tree.iter() {
            let value = object.get(name).unwrap_or(&MISSING);

            let outcome = match node {
                RuleNode::Leaf(validation) => validation
                    .validate_value(value, context)
                    .map(FieldOutcome::Messages),
                RuleNode::Nested(nested) => {
                    let nested_context = match self.nested_context {
                        NestedContext::Root => context,
                        NestedContext::Parent => value,
                    };
                    Some(FieldOutcome::Nested(self.validate_tree(
                        nested,
                        value,
                        nested_context,
                    )))
                }
                RuleNode::Passthrough => Some(FieldOutcome::Passthrough(value.clone())),
            };

            if let Some(outcome) = outcome {
                result.insert(name.to_string(), outcome);
            }
        }

        result.prune();
        result
    }
}

/// Build an [ObjectValidator] from a rule tree.
pub fn validate<T: Into<RuleTree>>(tree: T) -> ObjectValidator {
    ObjectValidator::new(tree.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{is_valid, length, match_field, v, with_validation};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::cell::Cell;

    fn always(message: &'static str) -> FieldValidator {
        FieldValidator::new(move |_, _| Some(message.to_string()))
    }

    fn username_rules() -> RuleTree {
        RuleTree::new().field("username", v![length(json!({ "length": 6 }))])
    }

    #[test]
    fn passing_object_has_empty_result() {
        let result = validate(username_rules()).validate(&json!({ "username": "bethesda" }));
        assert_eq!(ValidationResult::new(), result);
        assert!(is_valid(&result));
    }

    #[test]
    fn failing_field_is_reported() {
        let result = validate(username_rules()).validate(&json!({ "username": "bob" }));
        assert_eq!(json!({ "username": ["has to be at least 6 characters long"] }), result.to_json());
    }

    #[test]
    fn rules_drive_iteration() {
        let checked = Rc::new(Cell::new(0));
        let counter = Rc::clone(&checked);
        let tree = RuleTree::new().field(
            "declared",
            FieldValidator::new(move |_, _| {
                counter.set(counter.get() + 1);
                None
            }),
        );

        let result = validate(tree).validate(&json!({ "undeclared": "x", "other": 1 }));
        assert!(result.is_empty());
        assert_eq!(1, checked.get());
    }

    #[test]
    fn result_follows_declaration_order() {
        let tree = RuleTree::new()
            .field("b", always("b failed"))
            .field("a", always("a failed"));
        let result = validate(tree).validate(&json!({ "a": 1, "b": 2 }));

        let fields: Vec<&str> = result.iter().map(|(field, _)| field).collect();
        assert_eq!(vec!["b", "a"], fields);
    }

    #[test]
    fn absent_object_reads_fields_as_null() {
        let seen = Rc::new(Cell::new(false));
        let seen_null = Rc::clone(&seen);
        let tree = RuleTree::new().field(
            "name",
            FieldValidator::new(move |value, _| {
                seen_null.set(value.is_null());
                None
            }),
        );

        assert!(validate(tree).validate(&Value::Null).is_empty());
        assert!(seen.get());
    }

    #[test]
    fn nested_results_are_pruned_when_clean() {
        let tree = RuleTree::new().field("address", RuleTree::new().field("city", username_rules()));
        let result = validate(tree).validate(&json!({ "address": { "city": { "username": "bethesda" } } }));
        assert!(is_valid(&result));
    }

    #[test]
    fn nested_rules_see_root_context_by_default() {
        let tree = RuleTree::new()
            .field("password", FieldValidator::new(|_, _| None))
            .field(
                "confirm",
                RuleTree::new().field("password", v![match_field(json!({ "field": "password" }))]),
            );

        let matching = json!({ "password": "Secret1", "confirm": { "password": "Secret1" } });
        assert!(validate(tree.clone()).validate(&matching).is_empty());

        let differing = json!({ "password": "Secret1", "confirm": { "password": "Secret2" } });
        assert_eq!(
            json!({ "confirm": { "password": ["does not match password"] } }),
            validate(tree).validate(&differing).to_json()
        );
    }

    #[test]
    fn parent_context_compares_within_nested_object() {
        let tree = RuleTree::new().field(
            "credentials",
            RuleTree::new()
                .field("password", FieldValidator::new(|_, _| None))
                .field("confirm", v![match_field(json!({ "field": "password" }))]),
        );
        let object = json!({ "credentials": { "password": "a", "confirm": "a" } });

        let root = validate(tree.clone()).validate(&object);
        assert_eq!(
            json!({ "credentials": { "confirm": ["does not match password"] } }),
            root.to_json()
        );

        let parent = validate(tree)
            .with_nested_context(NestedContext::Parent)
            .validate(&object);
        assert!(is_valid(&parent));
    }

    #[test]
    fn passthrough_copies_truthy_values() {
        let tree = RuleTree::new().passthrough("id").passthrough("missing");
        let result = validate(tree).validate(&json!({ "id": 7 }));
        assert_eq!(json!({ "id": 7 }), result.to_json());
    }

    #[test]
    #[should_panic(expected = "predicate failed unexpectedly")]
    fn predicate_panics_reach_the_caller() {
        let exploding = with_validation(|_, _, _| panic!("predicate failed unexpectedly")).build(());
        validate(RuleTree::new().field("a", v![exploding])).validate(&json!({ "a": 1 }));
    }

    #[test]
    fn validation_is_repeatable() {
        let validator = validate(username_rules());
        let object = json!({ "username": "bob" });
        assert_eq!(validator.validate(&object), validator.validate(&object));
    }

    #[test]
    fn tree_from_iterator() {
        let tree: RuleTree = vec![
            ("first", RuleNode::from(always("x"))),
            ("second", RuleNode::Passthrough),
        ]
        .into_iter()
        .collect();
        assert_eq!(2, tree.len());
        assert!(matches!(tree.get("second"), Some(RuleNode::Passthrough)));
    }
}
