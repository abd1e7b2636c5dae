use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use gas_exp::gas;
use gas_exp::record::SELECTION_COMPLETED_PARAM;
use gas_exp::RunRecord;
use std::collections::HashSet;

/// Column template of a sheet: the parameter and gas keys, in column order,
/// and the number of slots of each multi-value gas key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    params: Vec<String>,
    gas: Vec<String>,
    proposals: usize,
}

impl Schema {
    /// Infers the template of a group. The run with the most gas keys gives
    /// the base key order (first one wins ties); keys only present in other
    /// runs are appended in the order they are first seen.
    pub fn infer<'a>(
        runs: impl IntoIterator<Item = (&'a str, &'a RunRecord)>,
    ) -> Result<Self, Report> {
        let runs: Vec<_> = runs.into_iter().collect();

        let mut proposals = 0;
        let mut base: Option<&RunRecord> = None;
        for &(file, record) in runs.iter() {
            let run_proposals = record
                .proposals()
                .wrap_err_with(|| format!("infer proposals of {}", file))?;
            proposals = proposals.max(run_proposals).max(record.max_users());

            let more_keys = base
                .map(|base| record.gas.len() > base.gas.len())
                .unwrap_or(true);
            if more_keys {
                base = Some(record);
            }
        }

        let mut params = Vec::new();
        let mut gas = Vec::new();
        if let Some(base) = base {
            params.extend(base.params.keys().cloned());
            gas.extend(base.gas.keys().cloned());
        }

        // make sure no key is dropped
        let mut seen_params: HashSet<_> = params.iter().cloned().collect();
        let mut seen_gas: HashSet<_> = gas.iter().cloned().collect();
        for (file, record) in runs {
            for key in record.params.keys() {
                if seen_params.insert(key.clone()) {
                    tracing::warn!(
                        "parameter {:?} of {} not in template; appending it",
                        key,
                        file
                    );
                    params.push(key.clone());
                }
            }
            for key in record.gas.keys() {
                if seen_gas.insert(key.clone()) {
                    tracing::warn!(
                        "gas key {:?} of {} not in template; appending it",
                        key,
                        file
                    );
                    gas.push(key.clone());
                }
            }
        }

        Ok(Self {
            params,
            gas,
            proposals,
        })
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn gas(&self) -> &[String] {
        &self.gas
    }

    pub fn proposals(&self) -> usize {
        self.proposals
    }

    /// Number of columns taken by a gas key. Never zero, so that every key
    /// keeps its own header column.
    pub fn slot_width(&self, key: &str) -> usize {
        if gas::is_multi_value(key) {
            self.proposals.max(1)
        } else {
            1
        }
    }

    /// Position of the "Selection Completed" parameter, if any run has it.
    pub fn selection_completed(&self) -> Option<usize> {
        self.params
            .iter()
            .position(|param| param == SELECTION_COMPLETED_PARAM)
    }
}
