//! Async refresh orchestrator.
//!
//! Runs a [`DataManager`] in a tokio task, sending periodic
//! [`DashboardData`] snapshots through an `mpsc` channel so the TUI event
//! loop can consume them without any shared mutable state. Filtering and
//! aggregation stay in the UI via the pure query functions; the orchestrator
//! only keeps the dataset fresh.

use std::path::PathBuf;
use std::time::Duration;

use dash_data::reader::LoadedDataset;
use tokio::sync::mpsc;
use tokio::time;

use crate::data_manager::DataManager;

// ── Public types ──────────────────────────────────────────────────────────────

/// A single dataset snapshot forwarded to the TUI layer.
///
/// This is the primary data contract between the background runtime and the
/// presentation layer.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// The most recent dataset.
    pub dataset: LoadedDataset,
    /// Directory the dataset was loaded from.
    pub source_dir: PathBuf,
    /// Last load error, if the most recent refresh fell back to stale data.
    pub load_error: Option<String>,
}

// ── DashboardOrchestrator ─────────────────────────────────────────────────────

/// Background refresh coordinator.
///
/// Call [`DashboardOrchestrator::start`] to spin up the refresh loop in a
/// dedicated tokio task and receive a channel endpoint for
/// [`DashboardData`] updates.
pub struct DashboardOrchestrator {
    /// How often to re-check the source files.
    refresh_interval: Duration,
    /// Directory containing the CSV sources.
    data_dir: PathBuf,
}

impl DashboardOrchestrator {
    /// Create a new orchestrator.
    ///
    /// # Parameters
    /// - `refresh_interval_secs` – seconds between source re-checks.
    /// - `data_dir`              – directory containing the CSV sources.
    pub fn new(refresh_interval_secs: u64, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            refresh_interval: Duration::from_secs(refresh_interval_secs),
            data_dir: data_dir.into(),
        }
    }

    /// Start the refresh loop.
    ///
    /// Spawns a tokio task that runs the loop. Returns:
    /// - An `mpsc::Receiver<DashboardData>` for the caller to poll.
    /// - A [`DashboardHandle`] that can be used to abort the loop.
    pub fn start(self) -> (mpsc::Receiver<DashboardData>, DashboardHandle) {
        // Buffer a modest number of snapshots so slow consumers don't stall the loop.
        let (tx, rx) = mpsc::channel(16);

        let handle = tokio::spawn(async move {
            self.refresh_loop(tx).await;
        });

        (rx, DashboardHandle { handle })
    }

    // ── Private implementation ────────────────────────────────────────────

    /// The main refresh loop.
    ///
    /// Performs an immediate load on startup, then repeats on
    /// `refresh_interval`. The loop exits when the receiver side of the
    /// channel is closed.
    async fn refresh_loop(self, tx: mpsc::Sender<DashboardData>) {
        let mut data_manager = DataManager::new(self.data_dir.clone());

        // Initial fetch (force refresh to populate immediately).
        self.fetch_and_send(&mut data_manager, &tx, true).await;

        let mut interval = time::interval(self.refresh_interval);
        // Consume the first tick which fires immediately; we already fetched above.
        interval.tick().await;

        loop {
            interval.tick().await;

            if tx.is_closed() {
                tracing::debug!("dashboard channel closed; exiting loop");
                break;
            }

            self.fetch_and_send(&mut data_manager, &tx, false).await;
        }
    }

    /// Fetch data and send a [`DashboardData`] snapshot to the channel.
    async fn fetch_and_send(
        &self,
        data_manager: &mut DataManager,
        tx: &mpsc::Sender<DashboardData>,
        force: bool,
    ) {
        let dataset = match data_manager.get_data(force) {
            Some(d) => d.clone(),
            None => {
                tracing::warn!(
                    error = data_manager.last_error().unwrap_or("unknown"),
                    "no dataset available; skipping send"
                );
                return;
            }
        };

        let snapshot = DashboardData {
            dataset,
            source_dir: self.data_dir.clone(),
            load_error: data_manager.last_error().map(|e| e.to_string()),
        };

        if let Err(e) = tx.send(snapshot).await {
            tracing::warn!(error = %e, "failed to send dashboard snapshot; receiver dropped");
        }
    }
}

// ── DashboardHandle ───────────────────────────────────────────────────────────

/// A handle to the background refresh task.
///
/// Drop or call [`DashboardHandle::abort`] to stop the loop.
pub struct DashboardHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl DashboardHandle {
    /// Immediately abort the refresh loop.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
