use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{ConfigError, ScanWarning};
use crate::game::ModStatus;
use crate::ini_config::{ModConfig, INI_FILE_NAME};

/// Known file names of the mods, versioned alongside the upstream release they match.
///
/// Loaded from JSON when the upstream file set changes, so the scanner
/// itself never hard-codes names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModFileTable {
    pub version: String,
    pub primary: Vec<String>,
    pub patcher: Vec<String>,
    /// Subfolders checked for patcher files, "" meaning the executable directory.
    pub patcher_dirs: Vec<String>,
    /// Any `*.asi` starting with this prefix counts as the patcher.
    pub patcher_prefix: String,
    pub backends: BackendDlls,
}

/// DLLs used to guess the active backend when the INI can't be read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendDlls {
    pub xess: String,
    pub fsr: String,
    pub fsr_framegen: String,
    pub dlss: String,
}

impl Default for BackendDlls {
    fn default() -> Self {
        Self {
            xess: "libxess.dll".to_string(),
            fsr: "amd_fidelityfx_dx12.dll".to_string(),
            fsr_framegen: "amd_fidelityfx_framegeneration_dx12.dll".to_string(),
            dlss: "nvngx.dll".to_string(),
        }
    }
}

impl Default for ModFileTable {
    fn default() -> Self {
        Self {
            version: "0.7.9".to_string(),
            primary: [
                "OptiScaler.dll",
                "nvngx.dll",
                "libxess.dll",
                "libxess_dx11.dll",
                "amd_fidelityfx_vk.dll",
                "amd_fidelityfx_dx12.dll",
                "amd_fidelityfx_upscaler_dx12.dll",
                "amd_fidelityfx_framegeneration_dx12.dll",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            patcher: vec!["OptiPatcher.asi".to_string(), "nvngx_patch.dll".to_string()],
            patcher_dirs: vec!["plugins".to_string(), String::new()],
            patcher_prefix: "OptiPatcher".to_string(),
            backends: BackendDlls::default(),
        }
    }
}

impl ModFileTable {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn has_primary(&self, dir: &Path) -> bool {
        self.primary.iter().any(|name| file_exists_ci(dir, name))
    }

    pub fn has_patcher(&self, dir: &Path) -> bool {
        for sub in &self.patcher_dirs {
            let search = if sub.is_empty() { dir.to_path_buf() } else { dir.join(sub) };
            if !search.is_dir() {
                continue;
            }
            if let Some(name) = self.patcher.iter().find(|n| file_exists_ci(&search, n)) {
                debug!("Found {} in {}", name, search.display());
                return true;
            }
        }

        // Some releases get renamed by the user or by other loaders.
        let prefix = self.patcher_prefix.to_lowercase();
        if prefix.is_empty() {
            return false;
        }
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .any(|e| {
                let name = e.file_name().to_string_lossy().to_lowercase();
                name.ends_with(".asi") && name.starts_with(&prefix)
            })
    }

    /// Guesses upscaler and frame generation from the DLLs in `dir`.
    pub fn infer_status(&self, dir: &Path, has_patcher: bool) -> (String, bool) {
        let b = &self.backends;
        if file_exists_ci(dir, &b.xess) {
            ("XeSS".to_string(), false)
        } else if file_exists_ci(dir, &b.fsr) {
            if file_exists_ci(dir, &b.fsr_framegen) {
                ("FSR 3".to_string(), true)
            } else {
                ("FSR 2".to_string(), false)
            }
        } else if file_exists_ci(dir, &b.dlss) {
            ("DLSS".to_string(), has_patcher)
        } else {
            ("Auto".to_string(), false)
        }
    }
}

/// Result of inspecting one executable directory.
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub status: ModStatus,
    pub warning: Option<ScanWarning>,
}

/// Detects both mods in `dir` and derives the display fields.
///
/// With the primary mod present the INI is consulted; if it is missing or
/// unparsable the status is inferred from DLLs and a warning is attached.
pub fn inspect(dir: &Path, table: &ModFileTable, preset_tolerance: f32) -> Inspection {
    let has_primary_mod = table.has_primary(dir);
    let has_patcher_mod = table.has_patcher(dir);

    if !has_primary_mod {
        return Inspection {
            status: ModStatus {
                has_primary_mod,
                has_patcher_mod,
                ..ModStatus::default()
            },
            warning: None,
        };
    }

    let ini_path = dir.join(INI_FILE_NAME);
    match ModConfig::load(&ini_path) {
        Ok(cfg) => Inspection {
            status: ModStatus {
                has_primary_mod,
                has_patcher_mod,
                upscaler_method: Some(cfg.upscaler_display_name()),
                frame_gen_enabled: Some(cfg.frame_generation_enabled()),
                quality_preset: Some(cfg.quality_preset_label(preset_tolerance).to_string()),
            },
            warning: None,
        },
        Err(e) => {
            let (upscaler, fg) = table.infer_status(dir, has_patcher_mod);
            let reason = if e.is_not_found() {
                "missing".to_string()
            } else {
                e.to_string()
            };
            Inspection {
                status: ModStatus {
                    has_primary_mod,
                    has_patcher_mod,
                    upscaler_method: Some(upscaler),
                    frame_gen_enabled: Some(fg),
                    quality_preset: Some("Quality".to_string()),
                },
                warning: Some(ScanWarning::ConfigFallback {
                    dir: dir.to_path_buf(),
                    reason,
                }),
            }
        }
    }
}

/// Case-insensitive existence check for `name` directly inside `dir`.
fn file_exists_ci(dir: &Path, name: &str) -> bool {
    if dir.join(name).is_file() {
        return true;
    }
    match fs::read_dir(dir) {
        Ok(entries) => entries.flatten().any(|e| {
            e.file_name().to_string_lossy().eq_ignore_ascii_case(name)
                && e.file_type().map(|t| t.is_file()).unwrap_or(false)
        }),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_roundtrips_through_json_with_partial_fields() {
        let table: ModFileTable =
            serde_json::from_str(r#"{ "version": "0.8.0", "primary": ["OptiScaler.dll"] }"#)
                .unwrap();
        assert_eq!(table.version, "0.8.0");
        assert_eq!(table.primary, vec!["OptiScaler.dll".to_string()]);
        assert_eq!(table.patcher_prefix, "OptiPatcher");
        assert_eq!(table.backends.dlss, "nvngx.dll");
    }
}
