//! Picks the main game executable out of an install directory.

use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::ScanWarning;

/// Name fragments and folder lists that steer executable selection.
///
/// These were tuned against real storefront layouts and are expected to
/// drift, so they are data rather than code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExeHeuristics {
    /// Subfolders searched in order, "" meaning the install root.
    pub search_folders: Vec<String>,
    /// Installers and runtimes, never a game.
    pub system_denylist: Vec<String>,
    /// Names skipped when another candidate is available.
    pub deprioritized: Vec<String>,
    /// Xbox/GDK helper binaries, never a game.
    pub xbox_helpers: Vec<String>,
    /// Names the Xbox cascade treats as launchers or tooling.
    pub xbox_non_game: Vec<String>,
    /// Top-level folders under the Xbox root that hold no games.
    pub xbox_skip_folders: Vec<String>,
    pub wingdk_token: String,
    pub shipping_token: String,
    pub binaries_token: String,
}

impl Default for ExeHeuristics {
    fn default() -> Self {
        let v = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            search_folders: v(&["bin", "Binaries", "Game", ""]),
            system_denylist: v(&["unins", "setup", "installer", "redist", "vcredist", "directx"]),
            deprioritized: v(&["unins", "crash", "launch"]),
            xbox_helpers: v(&["gamelaunchhelper", "gamingrepairtool", "gamingrepair", "ueprereqsetup"]),
            xbox_non_game: v(&["helper", "launcher", "crashhandler", "unins"]),
            xbox_skip_folders: v(&["GameSave"]),
            wingdk_token: "wingdk".to_string(),
            shipping_token: "shipping".to_string(),
            binaries_token: "binaries".to_string(),
        }
    }
}

fn lower_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles
        .iter()
        .any(|n| !n.is_empty() && haystack.contains(&n.to_lowercase()))
}

fn is_exe(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("exe"))
        .unwrap_or(false)
}

impl ExeHeuristics {
    pub fn is_system_executable(&self, path: &Path) -> bool {
        contains_any(&lower_name(path), &self.system_denylist)
    }

    pub fn is_xbox_helper(&self, path: &Path) -> bool {
        contains_any(&lower_name(path), &self.xbox_helpers)
    }

    pub fn is_xbox_skip_folder(&self, name: &str) -> bool {
        self.xbox_skip_folders.iter().any(|f| f.eq_ignore_ascii_case(name))
    }

    /// Generic resolution: top-level `*.exe` in each search folder, first folder wins.
    ///
    /// Unreadable folders are recorded in `warnings` and skipped.
    pub fn find_game_executable(
        &self,
        root: &Path,
        warnings: &mut Vec<ScanWarning>,
    ) -> Option<PathBuf> {
        for folder in &self.search_folders {
            let search = if folder.is_empty() { root.to_path_buf() } else { root.join(folder) };
            if !search.is_dir() {
                continue;
            }

            let entries = match fs::read_dir(&search) {
                Ok(entries) => entries,
                Err(e) => {
                    warnings.push(ScanWarning::from_io(&search, &e));
                    continue;
                }
            };

            let mut executables: Vec<PathBuf> = entries
                .flatten()
                .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_exe(p) && !self.is_system_executable(p))
                .collect();
            executables.sort();

            if executables.is_empty() {
                continue;
            }

            let preferred = executables
                .iter()
                .find(|p| !contains_any(&lower_name(p), &self.deprioritized))
                .unwrap_or(&executables[0]);
            debug!("Resolved {} in {}", preferred.display(), search.display());
            return Some(preferred.clone());
        }
        None
    }

    /// Xbox/GDK resolution over a recursive search of `search_root`.
    ///
    /// `folder_name` is the game's top-level folder, used to correlate
    /// executable names when the package layout gives no better signal.
    pub fn find_xbox_executable(
        &self,
        search_root: &Path,
        folder_name: &str,
        warnings: &mut Vec<ScanWarning>,
    ) -> Option<PathBuf> {
        let mut candidates: Vec<PathBuf> = Vec::new();
        for entry in WalkDir::new(search_root).sort_by_file_name() {
            match entry {
                Ok(e) if e.file_type().is_file() => {
                    let p = e.path();
                    if is_exe(p) && !self.is_system_executable(p) && !self.is_xbox_helper(p) {
                        candidates.push(p.to_path_buf());
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().unwrap_or(search_root).to_path_buf();
                    match e.io_error() {
                        Some(io) => warnings.push(ScanWarning::from_io(path, io)),
                        None => warnings.push(ScanWarning::Io {
                            path,
                            message: e.to_string(),
                        }),
                    }
                }
            }
        }

        debug!(
            "{} candidate executables under {}",
            candidates.len(),
            search_root.display()
        );
        self.select_xbox_candidate(search_root, folder_name, &candidates)
    }

    /// The Xbox priority cascade over already-filtered candidates.
    pub fn select_xbox_candidate(
        &self,
        search_root: &Path,
        folder_name: &str,
        candidates: &[PathBuf],
    ) -> Option<PathBuf> {
        if candidates.is_empty() {
            return None;
        }

        let rel = |p: &Path| -> String {
            p.strip_prefix(search_root)
                .unwrap_or(p)
                .to_string_lossy()
                .to_lowercase()
        };
        let rel_dir = |p: &Path| -> String {
            p.strip_prefix(search_root)
                .unwrap_or(p)
                .parent()
                .map(|d| d.to_string_lossy().to_lowercase())
                .unwrap_or_default()
        };
        let shortest = |items: Vec<&PathBuf>| -> Option<PathBuf> {
            items.into_iter().min_by_key(|p| rel(p.as_path()).len()).cloned()
        };

        // 1. WinGDK builds, Shipping first
        let wingdk = self.wingdk_token.to_lowercase();
        let gdk: Vec<&PathBuf> = candidates.iter().filter(|p| rel(p.as_path()).contains(&wingdk)).collect();
        if !gdk.is_empty() {
            let shipping = self.shipping_token.to_lowercase();
            let pick = gdk
                .iter()
                .find(|p| lower_name(p).contains(&shipping))
                .unwrap_or(&gdk[0]);
            debug!("Selected WinGDK executable {}", pick.display());
            return Some((*pick).clone());
        }

        // 2. Anything under a Binaries folder
        let binaries = self.binaries_token.to_lowercase();
        let bins: Vec<&PathBuf> = candidates
            .iter()
            .filter(|p| rel_dir(p.as_path()).contains(&binaries))
            .collect();
        if let Some(pick) = shortest(bins) {
            debug!("Selected Binaries executable {}", pick.display());
            return Some(pick);
        }

        // 3. Non-launcher names, preferring one that looks like the folder
        let games: Vec<&PathBuf> = candidates
            .iter()
            .filter(|p| !contains_any(&lower_name(p), &self.xbox_non_game))
            .collect();
        if !games.is_empty() {
            let folder = folder_name.to_lowercase();
            let matching = games.iter().find(|p| {
                let stem = p
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_lowercase())
                    .unwrap_or_default();
                !stem.is_empty() && !folder.is_empty() && (stem.contains(&folder) || folder.contains(&stem))
            });
            let pick = matching.unwrap_or(&games[0]);
            debug!("Selected executable {}", pick.display());
            return Some((*pick).clone());
        }

        // 4. Last resort
        shortest(candidates.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(root: &str, rels: &[&str]) -> Vec<PathBuf> {
        rels.iter().map(|r| Path::new(root).join(r)).collect()
    }

    #[test]
    fn system_denylist_matches_substrings() {
        let h = ExeHeuristics::default();
        assert!(h.is_system_executable(Path::new("unins000.exe")));
        assert!(h.is_system_executable(Path::new("VC_Redist.x64.exe")));
        assert!(h.is_system_executable(Path::new("DXSETUP.exe")));
        assert!(!h.is_system_executable(Path::new("Game.exe")));
    }

    #[test]
    fn cascade_prefers_shortest_binaries_path() {
        let h = ExeHeuristics::default();
        let c = paths(
            "/x/Content",
            &["Engine/Binaries/Win64/CrashReportClient.exe", "Foo/Binaries/Win64/Foo.exe"],
        );
        let pick = h.select_xbox_candidate(Path::new("/x/Content"), "Foo", &c).unwrap();
        assert_eq!(pick, Path::new("/x/Content/Foo/Binaries/Win64/Foo.exe"));
    }

    #[test]
    fn cascade_correlates_folder_name() {
        let h = ExeHeuristics::default();
        let c = paths("/x/Content", &["Tools/Editor.exe", "Starfield.exe", "SomeLauncher.exe"]);
        let pick = h.select_xbox_candidate(Path::new("/x/Content"), "Starfield", &c).unwrap();
        assert_eq!(pick, Path::new("/x/Content/Starfield.exe"));
    }

    #[test]
    fn cascade_falls_back_to_shortest() {
        let h = ExeHeuristics::default();
        let c = paths("/x", &["tools/GameLauncherX.exe", "Launcher.exe"]);
        let pick = h.select_xbox_candidate(Path::new("/x"), "Other", &c).unwrap();
        assert_eq!(pick, Path::new("/x/Launcher.exe"));
    }

    #[test]
    fn root_path_tokens_do_not_leak_into_cascade() {
        let h = ExeHeuristics::default();
        let c = paths("/Binaries/WinGDK", &["Tools/zz.exe", "Game.exe"]);
        let pick = h.select_xbox_candidate(Path::new("/Binaries/WinGDK"), "Game", &c).unwrap();
        assert_eq!(pick, Path::new("/Binaries/WinGDK/Game.exe"));
    }
}
