#![deny(rust_2018_idioms)]

pub mod db;
mod fmt;
pub mod layout;
pub mod progress;
pub mod recap;
pub mod sheet;
pub mod xlsx;

// Re-exports.
pub use db::ResultsDB;
pub use fmt::CellFmt;
pub use layout::Variant;
pub use sheet::SheetData;
pub use xlsx::XlsxReport;

use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use std::path::PathBuf;

// folder with one subfolder of result files per experiment group
pub const RESULTS_DIR: &str = "results";

// workbook generated
pub const OUTPUT_FILE: &str = "results.xlsx";

#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub results_dir: PathBuf,
    pub output_file: PathBuf,
    pub variant: Variant,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(RESULTS_DIR),
            output_file: PathBuf::from(OUTPUT_FILE),
            variant: Variant::Recap,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportSummary {
    /// Worksheet name and number of data rows of each sheet written.
    pub sheets: Vec<(String, u32)>,
    /// Groups without result files.
    pub skipped: Vec<String>,
}

/// Renders every group of the results directory into a single workbook.
pub fn report(config: &ReportConfig) -> Result<ReportSummary, Report> {
    let db = ResultsDB::open(&config.results_dir)?;
    report_groups(&db, config, |_| {})
}

/// Same as `report`, for an already opened results directory; `on_group`
/// is called with the name of each group, written or skipped.
pub fn report_groups(
    db: &ResultsDB,
    config: &ReportConfig,
    mut on_group: impl FnMut(&str),
) -> Result<ReportSummary, Report> {
    let mut workbook = XlsxReport::new();
    let mut summary = ReportSummary::default();

    for (name, path) in db.groups() {
        // each sheet is fully written before the next group is loaded
        match ResultsDB::load_group(name, path)? {
            Some(group) => {
                let sheet = SheetData::build(&group, config.variant)?;
                let sheet_name = workbook
                    .add_sheet(&sheet)
                    .wrap_err_with(|| format!("render group {}", name))?;
                summary.sheets.push((sheet_name, sheet.rows()));
            }
            None => summary.skipped.push(name.to_string()),
        }
        on_group(name);
    }

    workbook.save(&config.output_file)?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn write_run(group: &Path, file: &str, data: serde_json::Value) {
        std::fs::create_dir_all(group).unwrap();
        gas_exp::serialize(data, group.join(file)).unwrap();
    }

    #[test]
    fn report_test() {
        let root = std::env::temp_dir()
            .join(format!("gas_report_e2e_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let results_dir = root.join("results");

        let a = results_dir.join("A");
        write_run(
            &a,
            "run_1.json",
            json!({
                "params": {"# of Proposals": 3, "Selection Completed": true},
                "gas": {
                    "deployment": 5000,
                    "submission": {"0": 100, "1": 110, "2": 120},
                    "total": 5330,
                },
            }),
        );
        write_run(
            &a,
            "run_2.json",
            json!({
                "params": {"# of Proposals": 2, "Selection Completed": false},
                "gas": {
                    "deployment": 5000,
                    "submission": {"0": 90, "1": 95},
                    "total": 5185,
                },
            }),
        );
        write_run(
            &results_dir.join("B"),
            "run.json",
            json!({
                "params": {"# of Proposals": 1, "Selection Completed": true},
                "gas": {"deployment": 1},
            }),
        );
        std::fs::create_dir_all(results_dir.join("empty")).unwrap();

        for variant in [Variant::Plain, Variant::Recap] {
            let config = ReportConfig {
                results_dir: results_dir.clone(),
                output_file: root.join(format!("{:?}.xlsx", variant)),
                variant,
            };
            let db = ResultsDB::open(&config.results_dir).unwrap();
            let mut visited = Vec::new();
            let summary = report_groups(&db, &config, |group| {
                visited.push(group.to_string())
            })
            .unwrap();
            assert_eq!(visited, vec!["A", "B", "empty"]);
            assert_eq!(
                summary.sheets,
                vec![("A".to_string(), 2), ("B".to_string(), 1)]
            );
            assert_eq!(summary.skipped, vec!["empty".to_string()]);
            assert!(config.output_file.is_file());
        }

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn malformed_run_aborts_test() {
        let root = std::env::temp_dir()
            .join(format!("gas_report_e2e_bad_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        let group = root.join("results").join("bad");
        write_run(
            &group,
            "no_proposals.json",
            json!({"params": {}, "gas": {"deployment": 1}}),
        );

        let config = ReportConfig {
            results_dir: root.join("results"),
            output_file: root.join("results.xlsx"),
            variant: Variant::Recap,
        };
        assert!(report(&config).is_err());
        // nothing is written on failure
        assert!(!config.output_file.exists());

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn default_config_test() {
        let config = ReportConfig::default();
        assert_eq!(config.results_dir, PathBuf::from("results"));
        assert_eq!(config.output_file, PathBuf::from("results.xlsx"));
        assert_eq!(config.variant, Variant::Recap);
    }
}
