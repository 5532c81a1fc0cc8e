pub mod watch;

use anyhow::{Context, Result};
use bevy::log::{debug, warn};
use bevy::prelude::Resource;
use crossbeam_channel::Sender;
use lineage_core::SourceNode;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;

pub const SAMPLE_ORIGIN: &str = "bundled sample";
const SAMPLE_JSON: &str = include_str!("../../assets/sample_family.json");

/// Messages from the dataset thread to the frame loop.
#[derive(Debug, Clone)]
pub enum Incoming {
    Loaded {
        origin: String,
        root: Arc<SourceNode>,
    },
    Error {
        origin: String,
        message: String,
    },
}

impl Incoming {
    fn from_result(origin: &str, result: Result<Arc<SourceNode>>) -> Self {
        match result {
            Ok(root) => Self::Loaded {
                origin: origin.to_string(),
                root,
            },
            Err(e) => Self::Error {
                origin: origin.to_string(),
                message: format!("{e:#}"),
            },
        }
    }
}

pub fn sample() -> Result<Arc<SourceNode>> {
    lineage_core::from_json_str(SAMPLE_JSON).context("bundled sample is malformed")
}

pub async fn load_file(path: &Path) -> Result<Arc<SourceNode>> {
    let data = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read dataset {}", path.display()))?;
    lineage_core::from_json_str(&data)
        .with_context(|| format!("failed to decode dataset {}", path.display()))
}

/// Owned by the frame loop. Stopping or dropping it ends the loader thread,
/// including a watcher that is waiting for the next file change.
#[derive(Resource, Debug)]
pub struct LoaderHandle {
    stop: Option<oneshot::Sender<()>>,
}

impl LoaderHandle {
    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.stop.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            debug!("stopping dataset loader");
            let _ = stop.send(());
        }
    }
}

/// Loads the dataset on its own thread and, if asked, keeps reloading it
/// when the file changes. Without a path the bundled sample is sent.
pub fn spawn_loader(path: Option<PathBuf>, watch: bool, tx: Sender<Incoming>) -> LoaderHandle {
    let (stop_tx, stop_rx) = oneshot::channel();
    std::thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = %e, "dataset runtime unavailable, using bundled sample");
                let _ = tx.send(Incoming::from_result(SAMPLE_ORIGIN, sample()));
                return;
            }
        };
        rt.block_on(run(path, watch, tx, stop_rx));
    });
    LoaderHandle { stop: Some(stop_tx) }
}

async fn run(path: Option<PathBuf>, watch: bool, tx: Sender<Incoming>, stop: oneshot::Receiver<()>) {
    let Some(path) = path else {
        let _ = tx.send(Incoming::from_result(SAMPLE_ORIGIN, sample()));
        return;
    };

    let origin = path.display().to_string();
    let first = Incoming::from_result(&origin, load_file(&path).await);
    let failed = matches!(first, Incoming::Error { .. });
    if tx.send(first).is_err() {
        return;
    }
    if failed {
        let _ = tx.send(Incoming::from_result(SAMPLE_ORIGIN, sample()));
    }

    if !watch {
        return;
    }
    if let Err(e) = watch::watch_and_reload(&path, &tx, stop).await {
        let _ = tx.send(Incoming::Error {
            origin,
            message: format!("{e:#}"),
        });
    }
}
