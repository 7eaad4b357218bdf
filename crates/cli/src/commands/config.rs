//! Configuration inspection

use anyhow::Result;
use colored::Colorize;
use finder_lib::FinderConfig;

use crate::output::{print_json, OutputFormat};

/// Show the configuration resolved from the environment
pub fn show_config(config: &FinderConfig, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(config)?,
        OutputFormat::Table => {
            println!("{}", "Graviton Finder Configuration".bold());
            println!("{}", "-".repeat(50));
            println!("Redis minimum version:     {}", config.redis_min_version.cyan());
            println!("Memcached minimum version: {}", config.memcached_min_version.cyan());
            println!("Node size family:          {}", config.size_family);
            println!("Graviton marker:           {}", config.graviton_marker);
            println!("Report location:           s3://{}", config.report_location());
            println!("Report directory:          {}", config.report_dir.display());
            println!(
                "Region:                    {}",
                config.region.as_deref().unwrap_or("(default chain)")
            );
            println!("Alert topic:               {}", config.alert_topic);
            println!("Findings topic:            {}", config.findings_topic);
            println!("Run timeout:               {}s", config.run_timeout_secs);
        }
    }
    Ok(())
}
