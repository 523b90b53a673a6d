//! Editor start-up configuration

use std::path::PathBuf;

use crate::scene::DEFAULT_SCENE_FILE;

pub const ASSETS_VAR: &str = "NEEPS_ASSETS";
pub const SCENE_VAR: &str = "NEEPS_SCENE";
pub const VSYNC_VAR: &str = "NEEPS_VSYNC";

/// Window and file settings read once at start-up
///
/// Scene-wide values that are saved with a scene (background, ambient, vsync)
/// live in [`SceneSettings`](crate::scene::SceneSettings) instead. `vsync`
/// here only overrides the loaded scene's choice.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub assets: PathBuf,
    pub scene: PathBuf,
    pub load_scene_on_start: bool,
    pub vsync: Option<bool>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            title: "neeps".to_string(),
            width: 1280,
            height: 800,
            assets: PathBuf::from("./res"),
            scene: PathBuf::from(DEFAULT_SCENE_FILE),
            load_scene_on_start: true,
            vsync: None,
        }
    }
}

impl EditorConfig {
    /// Defaults overridden by `NEEPS_ASSETS`, `NEEPS_SCENE` and `NEEPS_VSYNC`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each variable
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(assets) = lookup(ASSETS_VAR) {
            config.assets = PathBuf::from(assets);
        }
        if let Some(scene) = lookup(SCENE_VAR) {
            config.scene = PathBuf::from(scene);
        }
        if let Some(vsync) = lookup(VSYNC_VAR) {
            match parse_flag(&vsync) {
                Some(flag) => config.vsync = Some(flag),
                None => log::warn!("ignoring {}={:?}: expected on/off", VSYNC_VAR, vsync),
            }
        }
        config
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_assets(mut self, path: impl Into<PathBuf>) -> Self {
        self.assets = path.into();
        self
    }

    pub fn with_scene(mut self, path: impl Into<PathBuf>) -> Self {
        self.scene = path.into();
        self
    }

    pub fn with_load_scene_on_start(mut self, load: bool) -> Self {
        self.load_scene_on_start = load;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = Some(vsync);
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.assets, PathBuf::from("./res"));
        assert_eq!(config.scene, PathBuf::from("my.scene"));
        assert!(config.load_scene_on_start);
        assert_eq!(config.vsync, None);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = EditorConfig::from_lookup(lookup_from(&[
            (ASSETS_VAR, "/data/assets"),
            (SCENE_VAR, "level.scene"),
            (VSYNC_VAR, "off"),
        ]));
        assert_eq!(config.assets, PathBuf::from("/data/assets"));
        assert_eq!(config.scene, PathBuf::from("level.scene"));
        assert_eq!(config.vsync, Some(false));
    }

    #[test]
    fn test_bad_vsync_is_ignored() {
        let config = EditorConfig::from_lookup(lookup_from(&[(VSYNC_VAR, "maybe")]));
        assert_eq!(config.vsync, None);
        assert_eq!(config.assets, PathBuf::from("./res"));
    }

    #[test]
    fn test_builder() {
        let config = EditorConfig::default()
            .with_title("Level editor")
            .with_size(640, 480)
            .with_load_scene_on_start(false)
            .with_vsync(true);
        assert_eq!(config.title, "Level editor");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(!config.load_scene_on_start);
        assert_eq!(config.vsync, Some(true));
    }
}
