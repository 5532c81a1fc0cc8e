use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::camera::NavSettings;
use crate::tree::{LayoutConfig, SceneConfig};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// JSON family tree; the bundled sample is shown when unset.
    pub dataset_path: Option<PathBuf>,
    pub watch_dataset: bool,
    pub max_generation: u32,
    pub layout: LayoutConfig,
    pub scene: SceneConfig,
    pub navigation: NavSettings,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            dataset_path: None,
            watch_dataset: true,
            max_generation: 8,
            layout: LayoutConfig::default(),
            scene: SceneConfig::default(),
            navigation: NavSettings::default(),
        }
    }
}

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub dataset: Option<PathBuf>,
    pub no_watch: bool,
}

impl CliArgs {
    pub fn apply(&self, cfg: &mut ViewerConfig) {
        if let Some(path) = &self.dataset {
            cfg.dataset_path = Some(path.clone());
        }
        if self.no_watch {
            cfg.watch_dataset = false;
        }
    }
}

pub fn parse_args() -> Result<CliArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

fn parse_args_from<I>(args: I) -> Result<CliArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = CliArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--dataset" {
            let Some(path) = args.next() else {
                anyhow::bail!("--dataset expects a path");
            };
            out.dataset = Some(PathBuf::from(path));
        } else if arg == "--no-watch" {
            out.no_watch = true;
        } else if arg.to_string_lossy().starts_with("--") {
            anyhow::bail!("unknown argument: {:?}", arg);
        } else if out.dataset.is_none() {
            out.dataset = Some(PathBuf::from(arg));
        } else {
            anyhow::bail!("unexpected extra argument: {:?}", arg);
        }
    }

    Ok(out)
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "lineage")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        bevy::log::warn!(path = %path.display(), %err, "ignoring malformed viewer config");
        ViewerConfig::default()
    })
}

pub fn save(cfg: &ViewerConfig) -> Result<PathBuf> {
    let Some(path) = config_file_path() else {
        anyhow::bail!("no config directory available");
    };
    save_to_path(cfg, &path)?;
    Ok(path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("viewer.toml");
        let mut cfg = ViewerConfig::default();
        cfg.dataset_path = Some(PathBuf::from("/data/family.json"));
        cfg.max_generation = 5;
        cfg.navigation.auto_rotate = false;

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn missing_or_malformed_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());

        fs::write(&path, "max_generation = \"lots\"").expect("write");
        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "max_generation = 3\n\n[layout]\ngeneration_gap = 500.0\n").expect("write");

        let cfg = load_or_default_from_path(&path);
        assert_eq!(cfg.max_generation, 3);
        assert_eq!(cfg.layout.generation_gap, 500.0);
        assert_eq!(cfg.layout.base_radius, 300.0);
        assert_eq!(cfg.navigation, NavSettings::default());
    }

    #[test]
    fn parses_positional_and_flag_dataset() {
        let cli = parse_args_from(os(&["family.json"])).expect("parsed");
        assert_eq!(cli.dataset, Some(PathBuf::from("family.json")));

        let cli = parse_args_from(os(&["--dataset", "a.json", "--no-watch"])).expect("parsed");
        assert_eq!(cli.dataset, Some(PathBuf::from("a.json")));
        assert!(cli.no_watch);

        assert!(parse_args_from(os(&["--dataset"])).is_err());
        assert!(parse_args_from(os(&["--bogus"])).is_err());
        assert!(parse_args_from(os(&["a.json", "b.json"])).is_err());
    }

    #[test]
    fn cli_overrides_file_settings() {
        let mut cfg = ViewerConfig::default();
        CliArgs {
            dataset: Some(PathBuf::from("x.json")),
            no_watch: true,
        }
        .apply(&mut cfg);
        assert_eq!(cfg.dataset_path, Some(PathBuf::from("x.json")));
        assert!(!cfg.watch_dataset);
    }
}
