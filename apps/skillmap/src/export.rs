//! JSON artifact writer. Each artifact is replaced as a whole: the payload is
//! written to a temp file in the target directory and then renamed over the
//! destination, so readers never observe a partial file.
//!
//! Concurrent writers to the same path are not coordinated.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

pub const POSTINGS_WITH_SKILLS: &str = "postings_with_skills.json";
pub const CLUSTERED_POSTINGS: &str = "clustered_postings.json";
pub const CLUSTER_STATS: &str = "cluster_stats.json";
pub const GAP_REPORTS: &str = "gap_reports.json";
pub const GAP_REPORTS_TEXT: &str = "gap_reports.txt";
pub const ARCHETYPE_RECOMMENDATIONS: &str = "archetype_recommendations.json";
pub const RUN_SUMMARY: &str = "run_summary.json";

/// Serializes `value` as pretty JSON to `dir/name`. Creates `dir` if needed.
pub fn write_json<T: Serialize + ?Sized>(dir: &Path, name: &str, value: &T) -> Result<PathBuf, AppError> {
    let payload = serde_json::to_vec_pretty(value)?;
    replace_file(dir, name, &payload)
}

pub fn write_text(dir: &Path, name: &str, text: &str) -> Result<PathBuf, AppError> {
    replace_file(dir, name, text.as_bytes())
}

fn replace_file(dir: &Path, name: &str, payload: &[u8]) -> Result<PathBuf, AppError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(payload)?;
    tmp.flush()?;
    tmp.persist(&path).map_err(|e| e.error)?;

    debug!("Wrote {} ({} bytes)", path.display(), payload.len());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("out");
        let path = write_json(&target, CLUSTER_STATS, &json!({"0": {"size": 2}})).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["0"]["size"], 2);
    }

    #[test]
    fn test_write_replaces_whole_file() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), RUN_SUMMARY, &json!({"long": "x".repeat(100)})).unwrap();
        let path = write_json(dir.path(), RUN_SUMMARY, &json!({"short": 1})).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, json!({"short": 1}));
    }

    #[test]
    fn test_write_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_text(dir.path(), GAP_REPORTS_TEXT, "GAP\n").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "GAP\n");
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        write_json(dir.path(), GAP_REPORTS, &Vec::<u8>::new()).unwrap();
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}
