//! List stored jobs command handler

use crate::config::Config;
use crate::constants;
use crate::db::Store;

pub async fn cmd_list_jobs(config: &Config, page: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let (jobs, total) = store
        .list_jobs(page.max(1), constants::limits::DEFAULT_PAGE_SIZE)
        .await?;

    if jobs.is_empty() {
        println!("No active jobs stored.");
        println!();
        println!("Ingest jobs with: naukrimili import <file.json>");
        return Ok(());
    }

    println!("Active Jobs ({total} total, page {page})");
    println!("{:-<70}", "");

    for job in jobs {
        println!("• {} at {} [{}]", job.title, job.company, job.country);
        println!(
            "  ID: {} | Applications: {} | Bookmarks: {}",
            job.id, job.application_count, job.bookmark_count
        );
    }

    Ok(())
}
