use anyhow::{Context, Result};
use bevy::log::{debug, info};
use crossbeam_channel::Sender;
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

use crate::source::{load_file, Incoming};

const COALESCE: Duration = Duration::from_millis(250);

/// Whether a filesystem event can change what the dataset file contains.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any
    )
}

fn touches(event: &notify::Event, file_name: &OsStr) -> bool {
    event.paths.iter().any(|p| p.file_name() == Some(file_name))
}

/// Watches the dataset's directory (editors often replace the file rather
/// than write it in place) and reloads once per quiet 250 ms window. Returns
/// when `stop` fires or its sender is dropped, or when the frame loop hangs up.
pub async fn watch_and_reload(
    path: &Path,
    tx: &Sender<Incoming>,
    mut stop: oneshot::Receiver<()>,
) -> Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("dataset path {} has no file name", path.display()))?
        .to_os_string();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    let (raw_tx, mut raw_rx) = mpsc::channel::<()>(64);
    let mut watcher: RecommendedWatcher = Watcher::new(
        move |res: std::result::Result<notify::Event, notify::Error>| {
            let Ok(event) = res else {
                return;
            };
            if is_content_change(&event.kind) && touches(&event, &file_name) {
                let _ = raw_tx.try_send(());
            }
        },
        notify::Config::default(),
    )?;
    watcher
        .watch(&dir, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", dir.display()))?;
    info!(path = %path.display(), "watching dataset");

    let origin = path.display().to_string();
    let mut tick = tokio::time::interval(COALESCE);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let mut dirty = false;

    loop {
        tokio::select! {
            _ = &mut stop => {
                debug!(path = %path.display(), "dataset watcher stopped");
                break;
            }
            msg = raw_rx.recv() => match msg {
                Some(()) => dirty = true,
                None => break,
            },
            _ = tick.tick() => {
                if !dirty {
                    continue;
                }
                dirty = false;
                debug!(path = %path.display(), "dataset changed, reloading");
                let incoming = match load_file(path).await {
                    Ok(root) => Incoming::Loaded { origin: origin.clone(), root },
                    Err(e) => Incoming::Error { origin: origin.clone(), message: format!("{e:#}") },
                };
                if tx.send(incoming).is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
