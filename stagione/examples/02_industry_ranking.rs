mod common;

use std::sync::Arc;

use stagione::{Industry, JobEvent, MemoryStore, Month, Stagione};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stagione=info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    // Industry definitions normally come from a reference load; seed one
    // here so the ranking has something to chew on.
    store
        .insert_industry(Industry {
            code: "801120".to_owned(),
            name: "Beverages".to_owned(),
            level: 1,
            parent_code: None,
            index_code: Some("801120.SI".to_owned()),
        })
        .await;

    let engine = Arc::new(
        Stagione::builder()
            .with_connector(common::get_connector())
            .with_store(store)
            .build()?,
    );

    // Rank every industry by its odds of closing February up.
    let mut rx = engine.start_bulk_ranking(Month::new(2)?, 3, 20)?;
    while let Some(event) = rx.recv().await {
        match event {
            JobEvent::Progress(tick) => {
                println!("[{:>3}%] {}", tick.percent, tick.message);
            }
            JobEvent::Finished(outcome) => {
                println!(
                    "ranked {} of {} industries ({} failed)",
                    outcome.succeeded, outcome.attempted, outcome.failed
                );
                for (pos, row) in outcome.rankings.iter().enumerate() {
                    println!(
                        "{:>2}. {} ({} stocks): {}% up in February",
                        pos + 1,
                        row.industry.name,
                        row.stock_count,
                        row.stats.up_probability,
                    );
                }
            }
            JobEvent::Failed { message } => return Err(message.into()),
        }
    }

    Ok(())
}
