use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::exe_finder::ExeHeuristics;
use crate::game::Platform;
use crate::ini_config::DEFAULT_PRESET_TOLERANCE;
use crate::mod_files::ModFileTable;
use crate::scanner::{PlatformRoots, ScanSettings};

pub const CONFIG_FILE_NAME: &str = "optiscaler_manager.json";
pub const LOG_FILE_NAME: &str = "optiscaler_manager.log";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_true")]
    pub scan_steam: bool,
    #[serde(default = "default_true")]
    pub scan_epic: bool,
    #[serde(default = "default_true")]
    pub scan_xbox: bool,
    #[serde(default = "default_true")]
    pub scan_gog: bool,
    #[serde(default = "default_true")]
    pub scan_ea: bool,
    #[serde(default = "default_true")]
    pub scan_ubisoft: bool,

    #[serde(default = "default_vec")]
    pub custom_game_paths: Vec<String>,

    // Library overrides, empty means the storefront default
    #[serde(default)]
    pub steam_library_path: String,
    #[serde(default)]
    pub epic_manifests_path: String,
    #[serde(default)]
    pub xbox_library_path: String,
    #[serde(default)]
    pub gog_library_path: String,
    #[serde(default)]
    pub ea_library_path: String,
    #[serde(default)]
    pub ubisoft_library_path: String,

    #[serde(default)]
    pub exe_heuristics: ExeHeuristics,

    /// JSON `ModFileTable` replacing the built-in file names.
    #[serde(default)]
    pub mod_files: Option<PathBuf>,

    #[serde(default = "default_tolerance")]
    pub quality_preset_tolerance: f32,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_true() -> bool {
    true
}

fn default_vec() -> Vec<String> {
    Vec::new()
}

fn default_tolerance() -> f32 {
    DEFAULT_PRESET_TOLERANCE
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_steam: true,
            scan_epic: true,
            scan_xbox: true,
            scan_gog: true,
            scan_ea: true,
            scan_ubisoft: true,
            custom_game_paths: Vec::new(),
            steam_library_path: String::new(),
            epic_manifests_path: String::new(),
            xbox_library_path: String::new(),
            gog_library_path: String::new(),
            ea_library_path: String::new(),
            ubisoft_library_path: String::new(),
            exe_heuristics: ExeHeuristics::default(),
            mod_files: None,
            quality_preset_tolerance: DEFAULT_PRESET_TOLERANCE,
            log_level: default_log_level(),
        }
    }
}

fn override_path(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
}

impl AppConfig {
    pub fn enabled_platforms(&self) -> Vec<Platform> {
        let toggles = [
            self.scan_steam,
            self.scan_epic,
            self.scan_xbox,
            self.scan_gog,
            self.scan_ea,
            self.scan_ubisoft,
        ];
        Platform::STOREFRONTS
            .iter()
            .zip(toggles)
            .filter(|(_, on)| *on)
            .map(|(p, _)| *p)
            .collect()
    }

    pub fn set_platform_enabled(&mut self, platform: Platform, enabled: bool) {
        match platform {
            Platform::Steam => self.scan_steam = enabled,
            Platform::Epic => self.scan_epic = enabled,
            Platform::Xbox => self.scan_xbox = enabled,
            Platform::Gog => self.scan_gog = enabled,
            Platform::Ea => self.scan_ea = enabled,
            Platform::Ubisoft => self.scan_ubisoft = enabled,
            Platform::Manual | Platform::Unknown => {}
        }
    }

    /// Storefront roots from the environment, with configured overrides applied.
    pub fn platform_roots(&self) -> PlatformRoots {
        let env_dir = |name: &str, fallback: &str| {
            std::env::var_os(name)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(fallback))
        };
        let mut roots = PlatformRoots::from_system_dirs(
            &env_dir("ProgramData", r"C:\ProgramData"),
            &env_dir("ProgramFiles", r"C:\Program Files"),
            &env_dir("ProgramFiles(x86)", r"C:\Program Files (x86)"),
        );

        roots.steam = override_path(&self.steam_library_path);
        roots.gog_library = override_path(&self.gog_library_path);
        if let Some(p) = override_path(&self.epic_manifests_path) {
            roots.epic_manifests = p;
        }
        if let Some(p) = override_path(&self.xbox_library_path) {
            roots.xbox = p;
        }
        if let Some(p) = override_path(&self.ea_library_path) {
            roots.ea.push(p);
        }
        if let Some(p) = override_path(&self.ubisoft_library_path) {
            roots.ubisoft.push(p);
        }
        roots
    }

    /// The configured mod file table, or the built-in one when unset or unreadable.
    pub fn mod_file_table(&self) -> ModFileTable {
        let Some(path) = &self.mod_files else {
            return ModFileTable::default();
        };
        match ModFileTable::load(path) {
            Ok(table) => table,
            Err(e) => {
                warn!("{}; using built-in mod file names", e);
                ModFileTable::default()
            }
        }
    }

    pub fn scan_settings(&self) -> ScanSettings {
        ScanSettings {
            platforms: self.enabled_platforms(),
            custom_paths: self
                .custom_game_paths
                .iter()
                .filter_map(|p| override_path(p))
                .collect(),
            roots: self.platform_roots(),
            heuristics: self.exe_heuristics.clone(),
            mod_files: self.mod_file_table(),
            preset_tolerance: self.quality_preset_tolerance,
        }
    }
}

/// `%LOCALAPPDATA%\OptiScaler Manager` when available, else next to the executable.
pub fn get_data_dir() -> PathBuf {
    if let Some(local) = std::env::var_os("LOCALAPPDATA") {
        return PathBuf::from(local).join("OptiScaler Manager");
    }
    // Try to use the directory of the executable
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(parent) = exe_path.parent() {
            return parent.to_path_buf();
        }
    }
    PathBuf::from(".")
}

pub fn get_config_path() -> PathBuf {
    get_data_dir().join(CONFIG_FILE_NAME)
}

/// Missing or corrupt files give the defaults.
pub fn load_config(path: &Path) -> AppConfig {
    if path.exists() {
        if let Ok(content) = fs::read_to_string(path) {
            match serde_json::from_str(&content) {
                Ok(cfg) => return cfg,
                Err(e) => warn!("Ignoring corrupt config {}: {}", path.display(), e),
            }
        }
    }
    AppConfig::default()
}

pub fn save_config(path: &Path, config: &AppConfig) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    let mut file = fs::File::create(path).map_err(io_err)?;
    file.write_all(content.as_bytes()).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{ "scan_epic": false, "custom_game_paths": ["D:\\Games\\Foo"] }"#)
                .unwrap();
        assert!(cfg.scan_steam);
        assert!(!cfg.scan_epic);
        assert_eq!(cfg.quality_preset_tolerance, DEFAULT_PRESET_TOLERANCE);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(
            cfg.enabled_platforms(),
            vec![Platform::Steam, Platform::Xbox, Platform::Gog, Platform::Ea, Platform::Ubisoft]
        );
    }

    #[test]
    fn overrides_flow_into_scan_settings() {
        let cfg = AppConfig {
            steam_library_path: r"E:\Steam".to_string(),
            xbox_library_path: r"F:\XboxGames".to_string(),
            custom_game_paths: vec!["  ".to_string(), r"D:\Games\Foo".to_string()],
            ..AppConfig::default()
        };
        let settings = cfg.scan_settings();
        assert_eq!(settings.roots.steam, Some(PathBuf::from(r"E:\Steam")));
        assert_eq!(settings.roots.xbox, PathBuf::from(r"F:\XboxGames"));
        assert_eq!(settings.custom_paths, vec![PathBuf::from(r"D:\Games\Foo")]);
    }

    #[test]
    fn corrupt_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(load_config(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let mut cfg = AppConfig::default();
        cfg.set_platform_enabled(Platform::Ubisoft, false);
        save_config(&path, &cfg).unwrap();
        assert_eq!(load_config(&path), cfg);
    }
}
