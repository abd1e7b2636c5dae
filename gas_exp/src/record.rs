use crate::gas::GasValue;
use color_eyre::eyre::{self, eyre};
use color_eyre::Report;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameter holding the number of proposals (i.e. users) of a run.
pub const PROPOSALS_PARAM: &str = "# of Proposals";

/// Parameter set when the selection phase of a run went through.
pub const SELECTION_COMPLETED_PARAM: &str = "Selection Completed";

/// The content of one result file: `{ "params": {...}, "gas": {...} }`.
///
/// Both maps keep the key order of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub params: Map<String, Value>,
    pub gas: Map<String, Value>,
}

impl RunRecord {
    pub fn new(params: Value, gas: Value) -> Result<Self, Report> {
        let params = match params {
            Value::Object(params) => params,
            other => eyre::bail!("params should be an object, found {}", other),
        };
        let gas = match gas {
            Value::Object(gas) => gas,
            other => eyre::bail!("gas should be an object, found {}", other),
        };
        Ok(Self { params, gas })
    }

    pub fn proposals(&self) -> Result<usize, Report> {
        let proposals = self
            .params
            .get(PROPOSALS_PARAM)
            .ok_or_else(|| eyre!("missing parameter {:?}", PROPOSALS_PARAM))?;
        proposals
            .as_u64()
            .map(|proposals| proposals as usize)
            .ok_or_else(|| {
                eyre!(
                    "parameter {:?} should be a non-negative integer, found {}",
                    PROPOSALS_PARAM,
                    proposals
                )
            })
    }

    pub fn selection_completed(&self) -> Option<bool> {
        self.params
            .get(SELECTION_COMPLETED_PARAM)
            .and_then(Value::as_bool)
    }

    pub fn gas_value(&self, key: &str) -> Option<GasValue> {
        self.gas
            .get(key)
            .map(|value| GasValue::from_json(key, value))
    }

    pub fn gas_values(&self) -> impl Iterator<Item = (&str, GasValue)> + '_ {
        self.gas
            .iter()
            .map(|(key, value)| (key.as_str(), GasValue::from_json(key, value)))
    }

    /// Largest number of per-user entries among the multi-value keys.
    pub fn max_users(&self) -> usize {
        self.gas_values()
            .map(|(_, value)| value.users())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> RunRecord {
        serde_json::from_value(json!({
            "params": {
                "# of Clusters": 3,
                "# of Proposals": 3,
                "Selection Completed": false,
            },
            "gas": {
                "deployment": 3000,
                "submission": {"0": 100, "1": 110, "2": 120},
                "endSubmission": 40,
                "reveal": {"0": 7, "1": 8},
                "total": 3385,
            }
        }))
        .expect("record should parse")
    }

    #[test]
    fn accessors_test() {
        let record = record();
        assert_eq!(record.proposals().unwrap(), 3);
        assert_eq!(record.selection_completed(), Some(false));
        assert_eq!(record.max_users(), 3);
        assert_eq!(
            record.gas_value("endSubmission"),
            Some(GasValue::Single(json!(40)))
        );
        assert_eq!(record.gas_value("missing"), None);

        let keys: Vec<_> = record.gas_values().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec!["deployment", "submission", "endSubmission", "reveal", "total"]
        );
    }

    #[test]
    fn proposals_errors_test() {
        let mut record = record();
        record.params.insert(PROPOSALS_PARAM.to_string(), json!("three"));
        assert!(record.proposals().is_err());

        record.params.remove(PROPOSALS_PARAM);
        assert!(record.proposals().is_err());
    }

    #[test]
    fn new_test() {
        assert!(RunRecord::new(json!({}), json!({})).is_ok());
        assert!(RunRecord::new(json!([]), json!({})).is_err());
        assert!(RunRecord::new(json!({}), json!(1)).is_err());
    }

    #[test]
    fn non_object_sections_rejected_test() {
        let result: Result<RunRecord, _> =
            serde_json::from_value(json!({"params": 1, "gas": {}}));
        assert!(result.is_err());
        let result: Result<RunRecord, _> =
            serde_json::from_value(json!({"params": {}}));
        assert!(result.is_err());
    }
}
