use serde_json::Value;

/// Gas keys incurred once per simulated user.
pub const MULTI_VALUE_KEYS: [&str; 4] =
    ["submission", "tokenApproval", "commitment", "reveal"];

/// Gas key under which a run stores its own grand total.
pub const TOTAL_KEY: &str = "total";

pub fn is_multi_value(key: &str) -> bool {
    MULTI_VALUE_KEYS.contains(&key)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserPhase {
    Submission,
    TokenApproval,
    Commitment,
    Reveal,
}

impl UserPhase {
    pub fn all() -> [UserPhase; 4] {
        [
            UserPhase::Submission,
            UserPhase::TokenApproval,
            UserPhase::Commitment,
            UserPhase::Reveal,
        ]
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::all().into_iter().find(|phase| phase.key() == key)
    }

    pub fn key(&self) -> &'static str {
        match self {
            UserPhase::Submission => "submission",
            UserPhase::TokenApproval => "tokenApproval",
            UserPhase::Commitment => "commitment",
            UserPhase::Reveal => "reveal",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UserPhase::Submission => "Submission",
            UserPhase::TokenApproval => "Token Approval",
            UserPhase::Commitment => "Commitment",
            UserPhase::Reveal => "Reveal",
        }
    }
}

/// Experiment phase a gas key is charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Total,
    Deployment,
    Partitioning,
    Selection,
    PerUser(UserPhase),
    Algorithm,
}

impl Bucket {
    pub fn classify(key: &str) -> Self {
        if key == TOTAL_KEY {
            return Bucket::Total;
        }
        if let Some(phase) = UserPhase::from_key(key) {
            return Bucket::PerUser(phase);
        }
        if key.starts_with("deployment") || key == "finalization" {
            return Bucket::Deployment;
        }
        let lower = key.to_lowercase();
        if lower.contains("partition") || lower.contains("assignment") {
            Bucket::Partitioning
        } else if lower.contains("selection") || lower == "scorematrix" {
            Bucket::Selection
        } else {
            Bucket::Algorithm
        }
    }

    pub fn is_per_user(&self) -> bool {
        matches!(self, Bucket::PerUser(_))
    }
}

/// A single gas entry of a run.
#[derive(Debug, Clone, PartialEq)]
pub enum GasValue {
    Single(Value),
    PerUser(Vec<Value>),
}

impl GasValue {
    /// Multi-value keys are always per-user: a per-index object keeps its
    /// values in file order and a bare scalar counts as a single user. Any
    /// other key is a single value, whatever its JSON shape.
    pub fn from_json(key: &str, value: &Value) -> Self {
        if !is_multi_value(key) {
            return GasValue::Single(value.clone());
        }
        match value {
            Value::Object(per_user) => {
                GasValue::PerUser(per_user.values().cloned().collect())
            }
            Value::Null => GasValue::PerUser(Vec::new()),
            value => GasValue::PerUser(vec![value.clone()]),
        }
    }

    pub fn users(&self) -> usize {
        match self {
            GasValue::Single(_) => 0,
            GasValue::PerUser(values) => values.len(),
        }
    }
}
