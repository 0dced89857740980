use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::ScanContext;
use crate::error::ScanWarning;
use crate::game::Platform;

/// The fields of an Epic launcher `.item` manifest the scanner needs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EpicManifest {
    #[serde(default)]
    pub install_location: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub launch_executable: Option<String>,
}

/// Parses an `.item` manifest. Missing fields are `None`; invalid JSON is an error.
pub fn parse_manifest(text: &str) -> Result<EpicManifest, serde_json::Error> {
    serde_json::from_str(text.trim_start_matches('\u{feff}'))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn manifest_files(ctx: &mut ScanContext<'_>, dir: &Path) -> Vec<PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => {
            let mut files: Vec<PathBuf> = entries
                .flatten()
                .map(|e| e.path())
                .filter(|p| {
                    p.is_file()
                        && p.extension()
                            .map(|e| e.eq_ignore_ascii_case("item"))
                            .unwrap_or(false)
                })
                .collect();
            files.sort();
            files
        }
        Err(e) => {
            ctx.warn(ScanWarning::from_io(dir, &e));
            Vec::new()
        }
    }
}

pub(super) fn scan(ctx: &mut ScanContext<'_>) {
    let dir = ctx.settings().roots.epic_manifests.clone();
    if !dir.is_dir() {
        debug!("Epic manifests folder {} does not exist", dir.display());
        return;
    }

    for path in manifest_files(ctx, &dir) {
        if ctx.is_cancelled() {
            break;
        }
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                ctx.warn(ScanWarning::from_io(&path, &e));
                continue;
            }
        };
        let manifest = match parse_manifest(&text) {
            Ok(m) => m,
            Err(e) => {
                ctx.warn(ScanWarning::MalformedManifest {
                    path: path.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let Some(location) = non_empty(&manifest.install_location) else {
            debug!("{} has no InstallLocation", path.display());
            continue;
        };
        let root = PathBuf::from(location);
        if !root.is_dir() {
            debug!("Epic install {} no longer exists", root.display());
            continue;
        }

        let launch = non_empty(&manifest.launch_executable)
            .map(|exe| root.join(exe))
            .filter(|exe| exe.is_file());
        let exe = match launch {
            Some(exe) => exe,
            None => match ctx.find_executable(&root) {
                Some(exe) => exe,
                None => {
                    ctx.warn(ScanWarning::NoExecutable { path: root });
                    continue;
                }
            },
        };

        let name = non_empty(&manifest.display_name)
            .map(str::to_string)
            .or_else(|| root.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_default();
        let game = ctx.record(name, &root, exe, Platform::Epic);
        ctx.add(game);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_known_fields_and_ignores_the_rest() {
        let m = parse_manifest(
            r#"{
                "FormatVersion": 0,
                "DisplayName": "Alan Wake 2",
                "InstallLocation": "D:\\Epic Games\\AlanWake2",
                "LaunchExecutable": "AlanWake2.exe",
                "bIsIncompleteInstall": false
            }"#,
        )
        .unwrap();
        assert_eq!(m.display_name.as_deref(), Some("Alan Wake 2"));
        assert_eq!(m.install_location.as_deref(), Some(r"D:\Epic Games\AlanWake2"));
        assert_eq!(m.launch_executable.as_deref(), Some("AlanWake2.exe"));
    }

    #[test]
    fn missing_fields_are_none() {
        let m = parse_manifest(r#"{ "DisplayName": "Foo" }"#).unwrap();
        assert_eq!(m.install_location, None);
        assert_eq!(m.launch_executable, None);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(parse_manifest(r#"{ "DisplayName": "Foo", "#).is_err());
    }
}
