use crate::db::{ExperimentGroup, Run};
use color_eyre::eyre::WrapErr;
use color_eyre::Report;
use gas_exp::RunRecord;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

const RESULT_EXTENSION: &str = "json";

/// The group folders of a results directory. Groups are only loaded on
/// demand, one at a time.
#[derive(Debug)]
pub struct ResultsDB {
    groups: Vec<(String, PathBuf)>,
}

impl ResultsDB {
    pub fn open(results_dir: impl AsRef<Path>) -> Result<Self, Report> {
        let results_dir = results_dir.as_ref();
        let read_dir = std::fs::read_dir(results_dir).wrap_err_with(|| {
            format!("read results directory {}", results_dir.display())
        })?;

        let mut groups = Vec::new();
        for entry in read_dir {
            let entry = entry.wrap_err("incorrect directory entry")?;
            let path = entry.path();
            // ignore anything that is not a group folder
            if !path.is_dir() {
                tracing::debug!("ignoring {}", path.display());
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            groups.push((name, path));
        }
        groups.sort();

        Ok(Self { groups })
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> impl Iterator<Item = (&str, &Path)> + '_ {
        self.groups
            .iter()
            .map(|(name, path)| (name.as_str(), path.as_path()))
    }

    /// Loads all result files of a group. Returns `None` if the folder has
    /// no result file.
    pub fn load_group(
        name: &str,
        path: &Path,
    ) -> Result<Option<ExperimentGroup>, Report> {
        // register load start time
        let start = std::time::Instant::now();

        let files = Self::list_files(path)
            .wrap_err_with(|| format!("list result files of group {}", name))?;
        if files.is_empty() {
            tracing::info!("group {} has no result files; skipping it", name);
            return Ok(None);
        }

        // parse all files; order is kept by the indexed collect
        let runs = files
            .into_par_iter()
            .map(|(file, path)| Self::load_run(file, &path))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "loaded {} runs of group {} after {:?}",
            runs.len(),
            name,
            start.elapsed(),
        );
        ExperimentGroup::new(name, runs).map(Some)
    }

    fn list_files(path: &Path) -> Result<Vec<(String, PathBuf)>, Report> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path).wrap_err("read group directory")?
        {
            let entry = entry.wrap_err("incorrect directory entry")?;
            let path = entry.path();
            let is_result = path.is_file()
                && path
                    .extension()
                    .map(|extension| {
                        extension.eq_ignore_ascii_case(RESULT_EXTENSION)
                    })
                    .unwrap_or(false);
            if !is_result {
                tracing::debug!("ignoring {}", path.display());
                continue;
            }
            let file = entry.file_name().to_string_lossy().into_owned();
            files.push((file, path));
        }
        files.sort();
        Ok(files)
    }

    fn load_run(file: String, path: &Path) -> Result<Run, Report> {
        let record: RunRecord = gas_exp::deserialize(path)
            .wrap_err_with(|| format!("deserialize {}", path.display()))?;
        Ok(Run { file, record })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn results_dir(test: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "gas_report_db_{}_{}",
            test,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).expect("create results dir");
        dir
    }

    fn write_run(dir: &Path, file: &str, proposals: usize) {
        let data = json!({
            "params": {"# of Proposals": proposals},
            "gas": {"deployment": 1},
        });
        gas_exp::serialize(data, dir.join(file)).expect("write run");
    }

    #[test]
    fn open_and_load_test() {
        let dir = results_dir("open_and_load");
        let b = dir.join("b");
        let a = dir.join("a");
        let empty = dir.join("empty");
        for group in [&a, &b, &empty] {
            std::fs::create_dir_all(group).unwrap();
        }
        // a stray file at the root is not a group
        std::fs::write(dir.join("notes.txt"), "x").unwrap();

        write_run(&a, "run_2.json", 2);
        write_run(&a, "run_1.json", 1);
        std::fs::write(a.join("README"), "not a result").unwrap();
        write_run(&b, "only.json", 4);

        let db = ResultsDB::open(&dir).unwrap();
        assert_eq!(db.group_count(), 3);
        let names: Vec<_> = db.groups().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b", "empty"]);

        let group = ResultsDB::load_group("a", &a).unwrap().unwrap();
        let files: Vec<_> =
            group.runs().iter().map(|run| run.file.as_str()).collect();
        assert_eq!(files, vec!["run_1.json", "run_2.json"]);
        assert_eq!(group.schema().proposals(), 2);

        assert!(ResultsDB::load_group("empty", &empty).unwrap().is_none());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn malformed_run_test() {
        let dir = results_dir("malformed_run");
        std::fs::write(dir.join("broken.json"), "{\"params\": ").unwrap();
        let result = ResultsDB::load_group("broken", &dir);
        assert!(result.is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_results_dir_test() {
        let dir = std::env::temp_dir().join("gas_report_db_missing_dir");
        assert!(ResultsDB::open(dir).is_err());
    }
}
