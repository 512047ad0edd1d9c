//! Log folder discovery and loading.

use crate::core::errors::{Error, Result};
use crate::event_log::{importer, EventLog};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List the log files in a folder, one dataset per file. Result artifacts
/// (`.json`) living next to the logs are skipped.
pub fn discover_logs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::Config(format!(
            "log folder {} is not a directory",
            folder.display()
        )));
    }

    let mut logs: Vec<PathBuf> = WalkDir::new(folder)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) != Some("json"))
        .collect();
    logs.sort();
    Ok(logs)
}

/// Load one log file. Only flexfringe `.txt` traces are supported.
pub fn load_log(path: &Path) -> Result<EventLog> {
    importer::import_from_file(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn discovery_skips_json_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "1 1\n1 1 x\n").unwrap();
        fs::write(dir.path().join("b.txt"), "1 1\n1 1 y\n").unwrap();
        fs::write(dir.path().join("old_results.json"), "{}").unwrap();

        let logs = discover_logs(dir.path()).unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|p| p.extension().unwrap() == "txt"));
    }

    #[test]
    fn discovery_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not_a_dir.txt");
        fs::write(&file, "").unwrap();
        assert!(discover_logs(&file).is_err());
    }
}
