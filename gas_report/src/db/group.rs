use crate::db::Schema;
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use gas_exp::RunRecord;

/// One result file of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub file: String,
    pub record: RunRecord,
}

/// A results folder: its runs, in file name order, and the column template
/// they share.
#[derive(Debug, Clone)]
pub struct ExperimentGroup {
    name: String,
    runs: Vec<Run>,
    schema: Schema,
}

impl ExperimentGroup {
    pub fn new(name: impl Into<String>, runs: Vec<Run>) -> Result<Self, Report> {
        let name = name.into();
        let schema = Schema::infer(
            runs.iter().map(|run| (run.file.as_str(), &run.record)),
        )
        .wrap_err_with(|| format!("infer column template of group {}", name))?;
        Ok(Self { name, runs, schema })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }
}
