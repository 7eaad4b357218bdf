//! Full pipeline run

use anyhow::Result;
use colored::Colorize;
use finder_lib::Pipeline;

use crate::output::{print_json, print_success, print_warning, OutputFormat};

/// Run the pipeline: upload both reports and send alerts
pub async fn run(pipeline: &Pipeline, format: OutputFormat) -> Result<()> {
    let report = pipeline.run().await?;

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Table => {
            print_success(&format!("Run {} completed", report.run_id));
            println!("{}", "=".repeat(50));
            println!("Clusters scanned:       {}", report.clusters_scanned);
            println!("Clusters in scope:      {}", report.clusters_included);
            println!(
                "Graviton candidates:    {}",
                report.candidates.to_string().green()
            );
            println!("Node types:             {}", report.node_types);
            for key in &report.uploaded {
                println!("Uploaded:               s3://{}/{}", pipeline.config().bucket_name, key);
            }
            if !report.under_reserved.is_empty() {
                print_warning(&format!(
                    "Under-reserved node types: {}",
                    report.under_reserved.join(", ")
                ));
            }
        }
    }

    Ok(())
}
