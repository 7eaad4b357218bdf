//! Dry-run analysis commands

use anyhow::Result;
use colored::Colorize;
use finder_lib::{Analysis, ClusterRecord, Pipeline, SummaryRow};
use tabled::Tabled;

use crate::output::{color_candidate, color_diff, print_info, print_json, print_table, OutputFormat};

/// Row for the candidate table
#[derive(Tabled)]
struct CandidateRow {
    #[tabled(rename = "Cluster Id")]
    cluster_id: String,
    #[tabled(rename = "Engine")]
    engine: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Graviton")]
    graviton: String,
    #[tabled(rename = "Node Type")]
    node_type: String,
}

impl From<&ClusterRecord> for CandidateRow {
    fn from(record: &ClusterRecord) -> Self {
        Self {
            cluster_id: record.cluster_id.clone(),
            engine: record.engine.to_string(),
            version: record.engine_version.clone(),
            graviton: color_candidate(record.is_candidate),
            node_type: record.node_type.clone(),
        }
    }
}

/// Row for the reservation summary table
#[derive(Tabled)]
struct ReservationRow {
    #[tabled(rename = "Node Type")]
    node_type: String,
    #[tabled(rename = "Reservations")]
    reserved: u32,
    #[tabled(rename = "Nodes deployed")]
    deployed: u32,
    #[tabled(rename = "Diff")]
    diff: String,
}

impl From<&SummaryRow> for ReservationRow {
    fn from(row: &SummaryRow) -> Self {
        Self {
            node_type: row.node_type.clone(),
            reserved: row.reserved,
            deployed: row.deployed,
            diff: color_diff(row.diff),
        }
    }
}

/// Classify and reconcile without uploading or alerting
pub async fn scan(pipeline: &Pipeline, candidates_only: bool, format: OutputFormat) -> Result<()> {
    let analysis = pipeline.scan().await?;

    match format {
        OutputFormat::Json => print_json(&analysis)?,
        OutputFormat::Table => print_analysis(&analysis, candidates_only),
    }

    Ok(())
}

fn print_analysis(analysis: &Analysis, candidates_only: bool) {
    let result = &analysis.result;

    println!("{}", "Graviton Candidates".bold());
    let candidates: Vec<CandidateRow> = result
        .candidate_rows
        .iter()
        .filter(|r| !candidates_only || r.is_candidate)
        .map(CandidateRow::from)
        .collect();
    print_table(&candidates);
    println!();

    println!("{}", "Reservation Summary".bold());
    let reservations: Vec<ReservationRow> =
        result.summary_rows.iter().map(ReservationRow::from).collect();
    print_table(&reservations);
    println!();

    print_info(&format!(
        "{} clusters scanned, {} in scope, {} Graviton candidates",
        analysis.clusters_scanned,
        result.candidate_rows.len(),
        result.candidate_count()
    ));
    let under_reserved: Vec<&str> = result
        .under_reserved()
        .map(|r| r.node_type.as_str())
        .collect();
    if !under_reserved.is_empty() {
        print_info(&format!("Under-reserved node types: {}", under_reserved.join(", ")));
    }
}
