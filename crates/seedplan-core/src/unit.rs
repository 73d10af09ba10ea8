//! Generation units and the runtime context they are planned against.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A named producer of one kind of record.
///
/// Every optional declaration has a serde default, so a manifest only needs
/// `name` and `record_kind` for the simplest unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationUnit {
    /// Unique identifier within a planning call.
    pub name: String,
    /// Kind of record this unit produces, e.g. `catalog.product`.
    pub record_kind: String,
    /// Units that must run first regardless of context.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explicit_dependencies: Vec<String>,
    /// Units that must run first when the named condition holds.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub conditional_dependencies: BTreeMap<String, Vec<String>>,
    /// Units required by business rules rather than by record structure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub business_logic_dependencies: Vec<String>,
    /// Tie-breaker among equally ready units. Lower runs first.
    #[serde(default)]
    pub execution_priority: i32,
    #[serde(default)]
    pub locale_aware: bool,
    #[serde(default)]
    pub business_rules_enabled: bool,
}

impl GenerationUnit {
    /// Create a unit with no declared dependencies and priority 0.
    pub fn new(name: impl Into<String>, record_kind: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_kind: record_kind.into(),
            explicit_dependencies: Vec::new(),
            conditional_dependencies: BTreeMap::new(),
            business_logic_dependencies: Vec::new(),
            execution_priority: 0,
            locale_aware: false,
            business_rules_enabled: false,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.execution_priority = priority;
        self
    }

    /// Add an explicit dependency on another unit.
    #[must_use]
    pub fn depends_on(mut self, name: impl Into<String>) -> Self {
        self.explicit_dependencies.push(name.into());
        self
    }

    /// Add a dependency that only applies while `condition` evaluates true.
    #[must_use]
    pub fn depends_on_when(mut self, condition: impl Into<String>, name: impl Into<String>) -> Self {
        self.conditional_dependencies
            .entry(condition.into())
            .or_default()
            .push(name.into());
        self
    }

    /// Add a business-logic dependency on another unit.
    #[must_use]
    pub fn requires_for_rules(mut self, name: impl Into<String>) -> Self {
        self.business_logic_dependencies.push(name.into());
        self
    }

    #[must_use]
    pub fn locale_aware(mut self, enabled: bool) -> Self {
        self.locale_aware = enabled;
        self
    }

    #[must_use]
    pub fn business_rules(mut self, enabled: bool) -> Self {
        self.business_rules_enabled = enabled;
        self
    }
}

/// Runtime context a plan is computed against.
///
/// A flat key/value map. Values are JSON so callers can pass language lists,
/// counts, or plain booleans without a schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlanContext {
    values: BTreeMap<String, Value>,
}

impl PlanContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Interpret the value under `key` as a boolean.
    ///
    /// Returns `None` when the key is absent so callers can fall through to
    /// another source.
    pub fn truthy(&self, key: &str) -> Option<bool> {
        self.values.get(key).map(value_is_truthy)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PlanContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut ctx = Self::new();
        for (k, v) in iter {
            ctx.insert(k, v);
        }
        ctx
    }
}

/// Parse a boolean-ish string: `1/true/yes/on` and `0/false/no/off`.
pub fn parse_bool_word(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn value_is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => parse_bool_word(s).unwrap_or(true),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
