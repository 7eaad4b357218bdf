//! CSV rendering of the candidate and reservation summary reports
//!
//! Both tables start with an unnamed index column holding the 0-based row
//! ordinal.

use std::path::{Path, PathBuf};

use crate::error::FinderError;
use crate::models::{ClusterRecord, SummaryRow};

pub const CANDIDATES_FILE: &str = "elasticache-graviton.csv";
pub const SUMMARY_FILE: &str = "elasticache-ri-summary.csv";

const CANDIDATE_HEADERS: [&str; 6] = ["", "Cluster Id", "Engine", "Version", "Graviton", "Node Type"];
const SUMMARY_HEADERS: [&str; 5] = ["", "Node Type", "Reservations", "Nodes deployed", "Diff"];

/// A rendered report ready to be written and uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: &'static str,
    pub body: Vec<u8>,
}

impl Artifact {
    pub fn as_str(&self) -> &str {
        std::str::from_utf8(&self.body).unwrap_or_default()
    }

    /// Number of data rows, excluding the header
    pub fn row_count(&self) -> usize {
        self.as_str().lines().count().saturating_sub(1)
    }

    /// Write the artifact under `dir` and return its path
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf, FinderError> {
        let path = dir.join(self.file_name);
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| self.report_error(e))?;
        tokio::fs::write(&path, &self.body)
            .await
            .map_err(|e| self.report_error(e))?;
        Ok(path)
    }

    fn report_error(&self, err: impl std::fmt::Display) -> FinderError {
        FinderError::Report {
            file: self.file_name.to_string(),
            message: err.to_string(),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn render<I>(file_name: &'static str, headers: &[&str], records: I) -> Result<Artifact, FinderError>
where
    I: IntoIterator<Item = Vec<String>>,
{
    let to_err = |e: String| FinderError::Report {
        file: file_name.to_string(),
        message: e,
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers).map_err(|e| to_err(e.to_string()))?;
    for (index, mut record) in records.into_iter().enumerate() {
        record.insert(0, index.to_string());
        writer.write_record(&record).map_err(|e| to_err(e.to_string()))?;
    }
    let body = writer.into_inner().map_err(|e| to_err(e.to_string()))?;

    Ok(Artifact { file_name, body })
}

/// Render the Graviton candidate table
pub fn render_candidates(rows: &[ClusterRecord]) -> Result<Artifact, FinderError> {
    render(
        CANDIDATES_FILE,
        &CANDIDATE_HEADERS,
        rows.iter().map(|r| {
            vec![
                r.cluster_id.clone(),
                r.engine.to_string(),
                r.engine_version.clone(),
                yes_no(r.is_candidate).to_string(),
                r.node_type.clone(),
            ]
        }),
    )
}

/// Render the reservation summary table
pub fn render_summary(rows: &[SummaryRow]) -> Result<Artifact, FinderError> {
    render(
        SUMMARY_FILE,
        &SUMMARY_HEADERS,
        rows.iter().map(|r| {
            vec![
                r.node_type.clone(),
                r.reserved.to_string(),
                r.deployed.to_string(),
                r.diff.to_string(),
            ]
        }),
    )
}
