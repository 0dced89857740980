use log::debug;
use std::path::PathBuf;

use super::ScanContext;
use crate::error::ScanWarning;
use crate::game::Platform;
use crate::game_path::GamePathFinder;
use crate::registry::Hive;

const STEAM_KEYS: [(Hive, &str, &str); 3] = [
    (Hive::LocalMachine, r"SOFTWARE\WOW6432Node\Valve\Steam", "InstallPath"), // x64 OS
    (Hive::LocalMachine, r"SOFTWARE\Valve\Steam", "InstallPath"),             // x86 OS
    (Hive::CurrentUser, r"Software\Valve\Steam", "SteamPath"),
];

fn find_install_path(ctx: &mut ScanContext<'_>) -> Option<PathBuf> {
    let registry = ctx.registry();
    for (hive, key, value) in STEAM_KEYS {
        match registry.read_string(hive, key, value) {
            Ok(Some(path)) if !path.trim().is_empty() => return Some(PathBuf::from(path.trim())),
            Ok(_) => {}
            Err(e) => ctx.warn(ScanWarning::Registry {
                key: format!("{}\\{}", hive.prefix(), key),
                message: e.to_string(),
            }),
        }
    }
    None
}

pub(super) fn scan(ctx: &mut ScanContext<'_>) {
    let steam_path = match ctx.settings().roots.steam.clone() {
        Some(path) => path,
        None => match find_install_path(ctx) {
            Some(path) => path,
            None => {
                debug!("Steam is not installed");
                return;
            }
        },
    };
    if !steam_path.is_dir() {
        debug!("Steam folder {} does not exist", steam_path.display());
        return;
    }

    for library in GamePathFinder::library_folders(&steam_path) {
        if ctx.is_cancelled() {
            break;
        }
        let common = library.join("steamapps").join("common");
        if !common.is_dir() {
            debug!("Skipping library {} without steamapps/common", library.display());
            continue;
        }

        let names = GamePathFinder::installed_app_names(&library);
        for game_dir in ctx.subdirs(&common) {
            if ctx.is_cancelled() {
                break;
            }
            let folder = game_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let Some(exe) = ctx.find_executable(&game_dir) else {
                debug!("No executable in {}", game_dir.display());
                continue;
            };
            let name = names.get(&folder.to_lowercase()).cloned().unwrap_or(folder);
            let game = ctx.record(name, &game_dir, exe, Platform::Steam);
            ctx.add(game);
        }
    }
}
