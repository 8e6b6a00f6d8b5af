use super::{status, ui};
use crate::core::DataFetcher;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Re-polls every `interval` and prints the status until interrupted.
pub async fn run(
    fetcher: &Arc<DataFetcher>,
    recent_count: usize,
    interval: Duration,
) -> Result<()> {
    info!(interval_secs = interval.as_secs(), "Watching Flatastic");

    loop {
        let (snapshot, states) = status::poll(fetcher, recent_count).await;
        println!("{}", status::render_status(&states, &snapshot.failures()));
        if let Some(fetched_at) = snapshot.fetched_at {
            println!(
                "\n{}",
                ui::style_text(
                    &format!("Updated {} (Ctrl-C to stop)", fetched_at.format("%H:%M:%S")),
                    ui::StyleType::Subtle
                )
            );
        }
        ui::print_separator();

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Stopping watch");
                return Ok(());
            }
        }
    }
}
