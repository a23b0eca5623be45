// src/main.rs

use snapkeep::{AgentConfig, BackupOrchestrator};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ==============================================================================
    // 1. Configuration & Telemetry
    // ==============================================================================

    tracing_subscriber::fmt::init();
    let config = AgentConfig::load()?;
    let interval = config.interval_minutes;
    let dry_run = config.dry_run;
    let trim_archive = config.archive_root.is_some();

    let mut agent = BackupOrchestrator::new(config);

    // ==============================================================================
    // 2. Schedule Check
    // ==============================================================================

    if !agent.time_to_backup(interval).await {
        tracing::info!(interval_minutes = interval, "backup interval not yet elapsed");
        return Ok(());
    }

    // ==============================================================================
    // 3. Mirror, Trim, Record
    // ==============================================================================

    tracing::info!(dry_run, "⚙️ snapkeep backup cycle starting");
    agent.backup().await?;

    if trim_archive {
        let report = agent.trim_archives().await?;
        // The report is the audit artifact; emit it whole for operators.
        println!("{}", serde_json::to_string_pretty(&report)?);

        if !report.errors.is_empty() {
            tracing::error!(
                failed = report.errors.len(),
                aborted = report.aborted,
                "archive trim finished with failures"
            );
            agent.finish().await?;
            std::process::exit(1);
        }
    }

    agent.finish().await?;
    tracing::info!("backup cycle complete");
    Ok(())
}
