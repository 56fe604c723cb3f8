use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

/// What a [ValidationResult] holds for one field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldOutcome {
    /// Failure messages, in the order the checks ran.
    Messages(Vec<String>),
    /// Failures of a nested rule tree.
    Nested(ValidationResult),
    /// A value copied from the input for a field declared as
    /// pass-through.
    Passthrough(Value),
}

impl FieldOutcome {
    /// The failure messages, if this outcome holds messages.
    pub fn messages(&self) -> Option<&[String]> {
        match self {
            FieldOutcome::Messages(messages) => Some(messages.as_slice()),
            FieldOutcome::Nested(_) | FieldOutcome::Passthrough(_) => None,
        }
    }

    /// The nested result, if this outcome holds one.
    pub fn nested(&self) -> Option<&ValidationResult> {
        match self {
            FieldOutcome::Nested(result) => Some(result),
            FieldOutcome::Messages(_) | FieldOutcome::Passthrough(_) => None,
        }
    }

    /// Outcomes that carry nothing are pruned from a result.
    fn is_empty(&self) -> bool {
        match self {
            FieldOutcome::Messages(messages) => messages.is_empty(),
            FieldOutcome::Nested(result) => result.is_empty(),
            FieldOutcome::Passthrough(value) => !is_truthy(value),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            FieldOutcome::Messages(messages) => {
                Value::Array(messages.iter().cloned().map(Value::String).collect())
            }
            FieldOutcome::Nested(result) => result.to_json(),
            FieldOutcome::Passthrough(value) => value.clone(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// The fields of an object that failed validation.
///
/// A field that is not present passed. A present field always carries
/// at least one message (directly or in a nested result).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    fields: IndexMap<String, FieldOutcome>,
}

impl ValidationResult {
    /// Create an empty `ValidationResult`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The number of fields that failed.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// The outcome for `field`, or `None` if it passed.
    pub fn get(&self, field: &str) -> Option<&FieldOutcome> {
        self.fields.get(field)
    }

    /// The failure messages for `field`, or `None` if it passed or
    /// holds a nested result.
    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.get(field).and_then(FieldOutcome::messages)
    }

    /// Iterate over the failed fields in rule declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldOutcome)> {
        self.fields
            .iter()
            .map(|(field, outcome)| (field.as_str(), outcome))
    }

    /// The result as a JSON object of `{ field: [messages] }`.
    pub fn to_json(&self) -> Value {
        let fields: Map<String, Value> = self
            .fields
            .iter()
            .map(|(field, outcome)| (field.clone(), outcome.to_json()))
            .collect();
        Value::Object(fields)
    }

    pub(crate) fn insert(&mut self, field: String, outcome: FieldOutcome) {
        self.fields.insert(field, outcome);
    }

    /// Drop every field whose outcome carries nothing.
    pub(crate) fn prune(&mut self) {
        self.fields.retain(|_, outcome| !outcome.is_empty());
    }

    /// Fold another result into this one. Messages for the same field
    /// are appended, nested results are merged, and any other
    /// combination takes the outcome from `other`.
    pub fn extend(&mut self, other: ValidationResult) {
        for (field, outcome) in other.fields {
            match self.fields.get_mut(&field) {
                Some(existing) => merge_outcome(existing, outcome),
                None => {
                    self.fields.insert(field, outcome);
                }
            }
        }
        self.prune();
    }
}

fn merge_outcome(existing: &mut FieldOutcome, outcome: FieldOutcome) {
    match (existing, outcome) {
        (FieldOutcome::Messages(existing), FieldOutcome::Messages(messages)) => {
            existing.extend(messages)
        }
        (FieldOutcome::Nested(existing), FieldOutcome::Nested(nested)) => existing.extend(nested),
        (existing, outcome) => *existing = outcome,
    }
}

impl<'a> IntoIterator for &'a ValidationResult {
    type Item = (&'a String, &'a FieldOutcome);
    type IntoIter = indexmap::map::Iter<'a, String, FieldOutcome>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Returns true if `result` records no failed field.
///
/// ## Example
/// ```
/// use object_validation::{is_valid, length, v, validate, RuleTree};
/// use serde_json::json;
///
/// let validator = validate(RuleTree::new().field("username", v![length(json!({ "length": 6 }))]));
/// assert!(is_valid(&validator.validate(&json!({ "username": "bethesda" }))));
/// assert!(!is_valid(&validator.validate(&json!({ "username": "bob" }))));
/// ```
pub fn is_valid(result: &ValidationResult) -> bool {
    result.is_empty()
}
