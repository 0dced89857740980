use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Platform {
    Steam,
    Epic,
    Xbox,
    #[serde(rename = "GOG")]
    Gog,
    #[serde(rename = "EA")]
    Ea,
    Ubisoft,
    Manual,
    #[default]
    Unknown,
}

impl Platform {
    /// Storefronts that can be scanned automatically, in scan order.
    pub const STOREFRONTS: [Platform; 6] = [
        Platform::Steam,
        Platform::Epic,
        Platform::Xbox,
        Platform::Gog,
        Platform::Ea,
        Platform::Ubisoft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Steam => "Steam",
            Platform::Epic => "Epic",
            Platform::Xbox => "Xbox",
            Platform::Gog => "GOG",
            Platform::Ea => "EA",
            Platform::Ubisoft => "Ubisoft",
            Platform::Manual => "Manual",
            Platform::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "steam" => Ok(Platform::Steam),
            "epic" => Ok(Platform::Epic),
            "xbox" | "gamepass" => Ok(Platform::Xbox),
            "gog" => Ok(Platform::Gog),
            "ea" | "origin" => Ok(Platform::Ea),
            "ubisoft" | "uplay" => Ok(Platform::Ubisoft),
            "manual" => Ok(Platform::Manual),
            other => Err(format!("unknown platform '{}'", other)),
        }
    }
}

/// Mod status derived from `OptiScaler.ini` or, failing that, from the DLLs on disk.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModStatus {
    pub has_primary_mod: bool,
    pub has_patcher_mod: bool,
    pub upscaler_method: Option<String>,
    pub frame_gen_enabled: Option<bool>,
    pub quality_preset: Option<String>,
}

/// One discovered game installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub name: String,
    pub install_root: PathBuf,
    pub executable_path: PathBuf,
    /// Directory holding the executable. Mods are installed here.
    pub executable_directory: PathBuf,
    pub platform: Platform,
    #[serde(default)]
    pub has_primary_mod: bool,
    #[serde(default)]
    pub has_patcher_mod: bool,
    pub last_scanned: DateTime<Local>,
    #[serde(default)]
    pub upscaler_method: Option<String>,
    #[serde(default)]
    pub frame_gen_enabled: Option<bool>,
    #[serde(default)]
    pub quality_preset: Option<String>,
}

impl GameRecord {
    /// Builds a record for `executable`, which must live inside an existing directory.
    pub fn new(
        name: impl Into<String>,
        install_root: impl Into<PathBuf>,
        executable: impl Into<PathBuf>,
        platform: Platform,
    ) -> Self {
        let install_root = install_root.into();
        let executable_path = executable.into();
        let executable_directory = executable_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| install_root.clone());

        Self {
            name: name.into(),
            install_root,
            executable_path,
            executable_directory,
            platform,
            has_primary_mod: false,
            has_patcher_mod: false,
            last_scanned: Local::now(),
            upscaler_method: None,
            frame_gen_enabled: None,
            quality_preset: None,
        }
    }

    pub fn id(&self) -> String {
        format!(
            "{}_{}_{}",
            self.platform,
            self.name,
            self.executable_path.to_string_lossy().to_lowercase()
        )
    }

    pub fn mod_status(&self) -> ModStatus {
        ModStatus {
            has_primary_mod: self.has_primary_mod,
            has_patcher_mod: self.has_patcher_mod,
            upscaler_method: self.upscaler_method.clone(),
            frame_gen_enabled: self.frame_gen_enabled,
            quality_preset: self.quality_preset.clone(),
        }
    }

    /// Returns a copy carrying `status`, stamped with the current time.
    pub fn with_mod_status(&self, status: ModStatus) -> Self {
        Self {
            has_primary_mod: status.has_primary_mod,
            has_patcher_mod: status.has_patcher_mod,
            upscaler_method: status.upscaler_method,
            frame_gen_enabled: status.frame_gen_enabled,
            quality_preset: status.quality_preset,
            last_scanned: Local::now(),
            ..self.clone()
        }
    }

    /// Path of the mod's INI for this game.
    pub fn ini_path(&self) -> PathBuf {
        self.executable_directory.join(crate::ini_config::INI_FILE_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_parses_aliases() {
        assert_eq!("GamePass".parse::<Platform>(), Ok(Platform::Xbox));
        assert_eq!("gog".parse::<Platform>(), Ok(Platform::Gog));
        assert!("itch".parse::<Platform>().is_err());
    }

    #[test]
    fn executable_directory_is_exe_parent() {
        let rec = GameRecord::new(
            "Foo",
            "/games/Foo",
            "/games/Foo/Binaries/Win64/Foo.exe",
            Platform::Steam,
        );
        assert_eq!(rec.executable_directory, PathBuf::from("/games/Foo/Binaries/Win64"));
        assert_eq!(rec.install_root, PathBuf::from("/games/Foo"));
    }

    #[test]
    fn with_mod_status_leaves_original_untouched() {
        let rec = GameRecord::new("Foo", "/g", "/g/foo.exe", Platform::Manual);
        let updated = rec.with_mod_status(ModStatus {
            has_primary_mod: true,
            upscaler_method: Some("DLSS".into()),
            ..ModStatus::default()
        });
        assert!(!rec.has_primary_mod);
        assert!(updated.has_primary_mod);
        assert_eq!(updated.upscaler_method.as_deref(), Some("DLSS"));
        assert_eq!(updated.executable_path, rec.executable_path);
    }

    #[test]
    fn platform_serializes_store_names() {
        let json = serde_json::to_string(&Platform::Gog).unwrap();
        assert_eq!(json, "\"GOG\"");
    }
}
