//! Reasoning logs on disk: nested JSON or flat CSV.
//!
//! | log   | json                                   | csv rows                        |
//! |-------|----------------------------------------|---------------------------------|
//! | tree  | `{thought, final_answer?, children?}`  | `level, thought, final_answer`  |
//! | runs  | `{"runs": [{answer, thoughts...}]}`    | `run_index, answer`             |
//!
//! The format selector is validated before any file is touched.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::agent::RunsLog;
use crate::error::LogError;
use crate::tree::{ThoughtRecord, ThoughtTree};

const TREE_HEADER: [&str; 3] = ["level", "thought", "final_answer"];
const RUNS_HEADER: [&str; 2] = ["run_index", "answer"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Csv,
}

impl FromStr for LogFormat {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(LogError::UnsupportedFormat(other.to_string())),
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), LogError> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    out.flush()?;
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, header: &[&str], rows: &[T]) -> Result<(), LogError> {
    let mut out = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    out.write_record(header)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush()?;
    Ok(())
}

/// Writes `tree` in `format`. A missing tree writes `{}` (json) or the header alone (csv).
pub fn write_tree_log(path: &Path, tree: Option<&ThoughtTree>, format: LogFormat) -> Result<(), LogError> {
    match (format, tree) {
        (LogFormat::Json, Some(tree)) => write_json(path, &tree.to_record()),
        (LogFormat::Json, None) => write_json(path, &serde_json::json!({})),
        (LogFormat::Csv, tree) => {
            let rows = tree.map(ThoughtTree::rows).unwrap_or_default();
            write_csv(path, &TREE_HEADER, &rows)
        }
    }
}

pub fn write_runs_log(path: &Path, log: &RunsLog, format: LogFormat) -> Result<(), LogError> {
    match format {
        LogFormat::Json => write_json(path, log),
        LogFormat::Csv => write_csv(path, &RUNS_HEADER, &log.rows()),
    }
}

/// Reads a nested tree log; `{}` yields `None`.
pub fn read_tree_log(path: &Path) -> Result<Option<ThoughtRecord>, LogError> {
    let value: serde_json::Value = serde_json::from_reader(File::open(path)?)?;
    if value.as_object().is_some_and(|o| o.is_empty()) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_value(value)?))
}

pub fn read_runs_log(path: &Path) -> Result<RunsLog, LogError> {
    Ok(serde_json::from_reader(File::open(path)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_selector() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("csv".parse::<LogFormat>().unwrap(), LogFormat::Csv);
        let err = "xml".parse::<LogFormat>().unwrap_err();
        assert!(matches!(err, LogError::UnsupportedFormat(ref f) if f == "xml"));
        assert!(err.to_string().contains("\"json\" or \"csv\""));
    }

    #[test]
    fn empty_tree_logs() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("tree.json");
        let csv = dir.path().join("tree.csv");
        write_tree_log(&json, None, LogFormat::Json).unwrap();
        write_tree_log(&csv, None, LogFormat::Csv).unwrap();
        assert_eq!(read_tree_log(&json).unwrap(), None);
        assert_eq!(std::fs::read_to_string(&csv).unwrap(), "level,thought,final_answer\n");
    }

    #[test]
    fn csv_quotes_multiline_thoughts() {
        let mut tree = ThoughtTree::new("root");
        let child = tree.add_child(tree.root(), "line one,\nline two").unwrap();
        tree.set_final_answer(child, "done").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tree.csv");
        write_tree_log(&path, Some(&tree), LogFormat::Csv).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "level,thought,final_answer\n0,root,\n1,\"line one,\nline two\",done\n"
        );
    }
}
