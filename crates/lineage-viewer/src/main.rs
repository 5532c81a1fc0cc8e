mod app;
mod camera;
mod render;
mod source;
mod tree;
mod ui;
mod util;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use crate::app::resources::SourceRx;
use crate::app::LineageViewerPlugin;
use crate::util::config;

fn main() -> anyhow::Result<()> {
    let cli = config::parse_args()?;
    let mut cfg = config::load_or_default();
    cli.apply(&mut cfg);

    let (tx, rx) = crossbeam_channel::unbounded();
    let loader = source::spawn_loader(cfg.dataset_path.clone(), cfg.watch_dataset, tx);

    let exit = App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Lineage".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(SourceRx(rx))
        .insert_resource(loader)
        .add_plugins(LineageViewerPlugin { cfg })
        .run();

    match exit {
        AppExit::Success => Ok(()),
        AppExit::Error(code) => anyhow::bail!("viewer exited with code {code}"),
    }
}
