use super::ui;
use crate::core::ConversionSession;
use crate::core::scheduler::{IntervalTicker, RefreshScheduler};
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

/// Prints a conversion, then a fresh one every `period` until Ctrl-C.
///
/// Failed updates leave the last printed conversion standing.
pub async fn run(session: &mut ConversionSession, period: Duration) -> Result<()> {
    println!("{}", ui::render_conversion(&session.convert().await));
    println!(
        "{}",
        ui::style_text(
            &format!("Updating every {}s, Ctrl-C to stop", period.as_secs()),
            ui::StyleType::Subtle
        )
    );

    let mut scheduler = RefreshScheduler::new(IntervalTicker::new(period));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("Failed to listen for Ctrl-C")?;
                debug!("Stopping watch");
                break;
            }
            update = scheduler.next_update(session) => {
                if let Some(conversion) = update {
                    println!("\n{}", ui::render_conversion(&conversion));
                }
            }
        }
    }
    Ok(())
}
