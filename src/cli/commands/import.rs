//! Bulk job ingestion from a JSON file

use anyhow::Context;

use crate::config::Config;
use crate::db::{JobInput, Store};

pub async fn cmd_import(config: &Config, path: &str, dry_run: bool) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {path}"))?;

    let inputs: Vec<JobInput> =
        serde_json::from_str(&content).context("Import file must be a JSON array of jobs")?;

    if inputs.is_empty() {
        println!("Nothing to import.");
        return Ok(());
    }

    if dry_run {
        println!("Parsed {} jobs (dry run, nothing written)", inputs.len());
        for input in inputs.iter().take(10) {
            println!("• {} at {}", input.title, input.company);
        }
        return Ok(());
    }

    let store = Store::new(&config.general.database_path).await?;
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for input in &inputs {
        if input.title.trim().is_empty() || input.company.trim().is_empty() {
            skipped += 1;
            continue;
        }
        store.insert_job(input).await?;
        imported += 1;
    }

    println!("Imported {imported} jobs ({skipped} skipped)");
    Ok(())
}
