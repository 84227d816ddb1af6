//! Watch mode for tasklens
//!
//! Re-uploads a spreadsheet into the session each time it changes on disk
//! and reprints the views. The file's directory is watched rather than the
//! file itself because spreadsheet editors usually save by replacing the
//! file.

use crate::cli::upload_name;
use crate::output::OutputFormatter;
use chrono::Local;
use notify::{Config, Event as FsEvent, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tasklens_core::error::{Result, TasklensError};
use tasklens_core::{Event, RecordNormalizer, Session, Views};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// Constants for watcher thread management
const WATCHER_POLL_INTERVAL: Duration = Duration::from_millis(100);
const WATCHER_SHUTDOWN_TIMEOUT: Duration = Duration::from_millis(200); // 2x poll interval

/// Keeps a session in sync with one spreadsheet on disk
pub struct FileWatcher<N> {
    session: Session<N>,
    path: PathBuf,
    formatter: Box<dyn OutputFormatter>,
    json_output: bool,
    interval_secs: u64,
    category: Option<String>,
}

impl<N: RecordNormalizer> FileWatcher<N> {
    pub fn new(
        session: Session<N>,
        path: impl Into<PathBuf>,
        formatter: Box<dyn OutputFormatter>,
        json_output: bool,
        interval_secs: u64,
    ) -> Self {
        Self {
            session,
            path: path.into(),
            formatter,
            json_output,
            interval_secs,
            category: None,
        }
    }

    /// Category to reselect after every reload
    pub fn with_category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn session(&self) -> &Session<N> {
        &self.session
    }

    /// Upload the current file contents into the session
    ///
    /// An upload resets the selection, so the requested category is selected
    /// again once the new data is in. A rejected upload keeps the previous
    /// views and their error message. A file that cannot be read (for
    /// instance mid-save) leaves the session untouched and returns `None`.
    pub async fn reload(&mut self) -> Option<&Views> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Could not read {}: {}", self.path.display(), e);
                return None;
            }
        };

        debug!("Reloading {} ({} bytes)", self.path.display(), bytes.len());
        let accepted = self
            .session
            .apply(Event::upload(bytes, upload_name(&self.path)))
            .error_message
            .is_none();

        if accepted && let Some(category) = &self.category {
            self.session.apply(Event::select(category.clone()));
        }
        Some(self.session.views())
    }

    /// Start the watch loop; returns on Ctrl+C
    pub async fn run(mut self) -> Result<()> {
        let should_stop = Arc::new(AtomicBool::new(false));
        let should_stop_watcher = should_stop.clone();

        let (tx, mut rx) = mpsc::channel(10);
        let watched_dir = watch_dir(&self.path);
        let target = self.path.file_name().map(|name| name.to_os_string());

        let mut watcher_handle = tokio::task::spawn_blocking(move || -> Result<()> {
            let mut watcher = RecommendedWatcher::new(
                move |result: notify::Result<FsEvent>| {
                    if let Ok(event) = result
                        && matches!(
                            event.kind,
                            EventKind::Create(_) | EventKind::Modify(_)
                        )
                        && event
                            .paths
                            .iter()
                            .any(|p| p.file_name() == target.as_deref())
                    {
                        let _ = tx.blocking_send(());
                    }
                },
                Config::default(),
            )
            .map_err(|e| TasklensError::Watch(format!("Failed to create file watcher: {e}")))?;

            watcher
                .watch(&watched_dir, RecursiveMode::NonRecursive)
                .map_err(|e| {
                    TasklensError::Watch(format!(
                        "Failed to watch directory {}: {e}",
                        watched_dir.display()
                    ))
                })?;

            // Keep the watcher alive until we're told to stop
            while !should_stop_watcher.load(Ordering::Acquire) {
                std::thread::sleep(WATCHER_POLL_INTERVAL);
            }

            drop(watcher);
            Ok(())
        });

        info!("Watching {}", self.path.display());
        self.refresh_display().await;

        let settle = Duration::from_secs(self.interval_secs);
        loop {
            tokio::select! {
                received = rx.recv() => {
                    if received.is_none() {
                        warn!("File watcher stopped");
                        break;
                    }
                    // Let the writer finish, then collapse the burst of events
                    tokio::time::sleep(settle).await;
                    while rx.try_recv().is_ok() {}
                    self.refresh_display().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    if !self.json_output {
                        println!("\nExiting watch mode...");
                    }
                    break;
                }
            }
        }

        // Signal the watcher thread to stop
        should_stop.store(true, Ordering::Release);

        tokio::select! {
            res = &mut watcher_handle => {
                match res {
                    Ok(Ok(())) => debug!("Watcher task exited gracefully"),
                    Ok(Err(e)) => return Err(e),
                    Err(e) => warn!("Watcher task failed: {}", e),
                }
            }
            _ = tokio::time::sleep(WATCHER_SHUTDOWN_TIMEOUT) => {
                watcher_handle.abort();
                warn!("Watcher task was aborted because it did not shut down gracefully in time");
            }
        }

        Ok(())
    }

    async fn refresh_display(&mut self) {
        let json_output = self.json_output;
        let interval_secs = self.interval_secs;

        if self.reload().await.is_none() {
            return;
        }

        if !json_output {
            print!("\x1B[2J\x1B[1;1H"); // Clear screen and move cursor to top-left
            println!(
                "Watching {} - Last updated: {}",
                self.path.display(),
                Local::now().format("%Y-%m-%d %H:%M:%S")
            );
            println!("Settle delay: {interval_secs}s | Press Ctrl+C to exit");
            println!("{}", "-".repeat(80));
        }
        println!("{}", self.formatter.format_views(self.session.views()));
    }
}

/// Directory holding `path`, the current directory for bare file names
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
