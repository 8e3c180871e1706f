mod bootstrap;

use anyhow::Result;
use dash_core::settings::Settings;
use dash_data::pipeline::run_pipeline;
use dash_runtime::orchestrator::DashboardOrchestrator;
use dash_ui::app::{App, ViewMode};
use dash_ui::table_view::{TableRowData, TableTotals};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Campaign Dash v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("View: {}, Theme: {}", settings.view, settings.theme);

    let Some(data_dir) = bootstrap::resolve_data_dir(settings.data_dir.as_deref()) else {
        anyhow::bail!(
            "no data directory found; pass --data-dir or place the CSV exports in ./data"
        );
    };
    tracing::info!("Data directory: {}", data_dir.display());

    let filter = settings.filter_spec();

    match settings.view.as_str() {
        "live" => {
            tracing::info!("Starting live dashboard...");

            let orchestrator =
                DashboardOrchestrator::new(u64::from(settings.refresh_rate), data_dir);

            let (rx, handle) = orchestrator.start();

            let app = App::new(&settings.theme, ViewMode::Live, filter);

            // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
            // We also listen for Ctrl+C at the OS level so that signals received
            // while the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run_live(rx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down refresh task");
                    handle.abort();
                }
            }
        }

        "channels" | "daily" => {
            tracing::info!("Running {} view...", settings.view);

            // One-shot Load → Filter → Aggregate pass.
            let snapshot = run_pipeline(&data_dir, &filter)?;
            tracing::info!(
                rows = snapshot.metadata.rows_loaded,
                dropped = snapshot.metadata.rows_dropped,
                "pipeline complete"
            );

            let (rows, view_mode): (Vec<TableRowData>, ViewMode) =
                if settings.view == "channels" {
                    let rows = snapshot
                        .result
                        .by_platform
                        .iter()
                        .map(|row| TableRowData {
                            label: row.platform.name().to_string(),
                            kpis: row.kpis.clone(),
                        })
                        .collect();
                    (rows, ViewMode::Channels)
                } else {
                    let rows = snapshot
                        .result
                        .by_date
                        .iter()
                        .map(|row| TableRowData {
                            label: row.date.format("%Y-%m-%d").to_string(),
                            kpis: row.kpis.clone(),
                        })
                        .collect();
                    (rows, ViewMode::Daily)
                };

            let totals = TableTotals {
                kpis: snapshot.result.kpis.clone(),
                group_count: rows.len() as u32,
            };

            let app = App::new(&settings.theme, view_mode, filter);

            app.run_table(rows, totals).await?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
