mod common;

use std::sync::Arc;

use stagione::{JobEvent, MemoryStore, Month, MonthSet, Stagione};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Build the orchestrator over one source and an in-memory store.
    let engine = Arc::new(
        Stagione::builder()
            .with_connector(common::get_connector())
            .with_store(Arc::new(MemoryStore::new()))
            .build()?,
    );

    // 2. Pull the catalog and monthly series into the store.
    println!("Refreshing monthly data...");
    let mut rx = engine.clone().start_data_refresh(false);
    while let Some(event) = rx.recv().await {
        if let JobEvent::Failed { message } = &event {
            return Err(message.clone().into());
        }
    }

    // 3. How has this stock behaved in February, historically?
    let february = MonthSet::single(Month::new(2)?);
    match engine
        .stock_seasonality("600519", Some(&february), 3, false)
        .await?
    {
        Some(result) => {
            let stats = result.report.stats();
            println!(
                "{} {}: up {}/{} Februaries ({}% up, avg gain {}%)",
                result.code,
                result.name,
                stats.up_count,
                stats.total_count,
                stats.up_probability,
                stats.avg_up_pct,
            );
        }
        None => println!("not enough history to say anything meaningful"),
    }

    Ok(())
}
