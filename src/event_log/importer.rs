//! Flexfringe trace file importer.
//!
//! The format is line-based: the first line is a header, every following
//! line describes one trace as `<label> <length> <event> <event> …` with the
//! events starting at the third token.

use crate::core::errors::{Error, Result};
use crate::event_log::{EventLog, Trace};
use std::fs;
use std::path::Path;

/// Import a `.txt` trace file into an event log named after the file stem.
pub fn import_from_file(path: &Path) -> Result<EventLog> {
    if path.extension().and_then(|e| e.to_str()) != Some("txt") {
        return Err(Error::log_import(path, "not a .txt trace file"));
    }

    let content = fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("unnamed")
        .to_string();

    Ok(EventLog::new(name, parse_traces(&content)))
}

fn parse_traces(content: &str) -> Vec<Trace> {
    content
        .lines()
        .skip(1) // header line
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            line.split_whitespace()
                .skip(2)
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use std::io::Write;

    #[test]
    fn parses_traces_after_header() {
        let content = indoc! {"
            3 5
            1 3 a b c
            1 2 a b
            1 0
        "};
        let traces = parse_traces(content);
        assert_eq!(traces.len(), 3);
        assert_eq!(traces[0], vec!["a", "b", "c"]);
        assert_eq!(traces[1], vec!["a", "b"]);
        assert!(traces[2].is_empty());
    }

    #[test]
    fn import_rejects_non_txt_files() {
        let result = import_from_file(Path::new("/tmp/log.xes"));
        assert!(result.is_err());
    }

    #[test]
    fn import_names_log_after_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hospital.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "1 2").unwrap();
        writeln!(file, "1 2 admit discharge").unwrap();
        drop(file);

        let log = import_from_file(&path).unwrap();
        assert_eq!(log.name(), "hospital");
        assert_eq!(log.len(), 1);
        assert_eq!(log.traces()[0], vec!["admit", "discharge"]);
    }
}
