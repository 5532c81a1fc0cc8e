use bevy::prelude::Resource;
use crossbeam_channel::Receiver;

use crate::source::Incoming;
use crate::util::config::ViewerConfig;

#[derive(Resource)]
pub struct SourceRx(pub Receiver<Incoming>);

/// The configuration the viewer started with; "Save as defaults" writes an
/// updated copy of it back to disk.
#[derive(Resource, Debug, Clone)]
pub struct ViewerSettings(pub ViewerConfig);

#[derive(Resource, Debug, Default)]
pub struct UiState {
    pub help_open: bool,
    pub status: Option<String>,
}
