use log::debug;
use std::path::{Path, PathBuf};

use super::{folders, ScanContext};
use crate::error::ScanWarning;
use crate::game::Platform;
use crate::registry::Hive;

const GOG_GAMES_KEY: &str = r"SOFTWARE\WOW6432Node\GOG.com\Games";

pub(super) fn scan(ctx: &mut ScanContext<'_>) {
    scan_registry(ctx);
    if let Some(library) = ctx.settings().roots.gog_library.clone() {
        folders::scan_roots(ctx, &[library], Platform::Gog);
    }
}

fn scan_registry(ctx: &mut ScanContext<'_>) {
    let registry = ctx.registry();
    let ids = match registry.subkeys(Hive::LocalMachine, GOG_GAMES_KEY) {
        Ok(ids) => ids,
        Err(e) => {
            ctx.warn(ScanWarning::Registry {
                key: format!("HKLM\\{}", GOG_GAMES_KEY),
                message: e.to_string(),
            });
            return;
        }
    };
    if ids.is_empty() {
        debug!("No GOG games registered");
        return;
    }

    for id in ids {
        if ctx.is_cancelled() {
            break;
        }
        let key = format!("{}\\{}", GOG_GAMES_KEY, id);
        let read = |value: &str| match registry.read_string(Hive::LocalMachine, &key, value) {
            Ok(v) => Ok(v.filter(|s| !s.trim().is_empty())),
            Err(e) => Err(ScanWarning::Registry {
                key: format!("HKLM\\{}", key),
                message: e.to_string(),
            }),
        };
        let values = (read("path"), read("gameName"), read("exe"));
        let (path, name, exe) = match values {
            (Ok(path), Ok(name), Ok(exe)) => (path, name, exe),
            (Err(w), ..) | (_, Err(w), _) | (.., Err(w)) => {
                ctx.warn(w);
                continue;
            }
        };

        let Some(path) = path else {
            debug!("GOG entry {} has no path", id);
            continue;
        };
        let root = PathBuf::from(path.trim());
        if !root.is_dir() {
            debug!("GOG install {} no longer exists", root.display());
            continue;
        }

        let exe = match registered_exe(&root, exe.as_deref()) {
            Some(exe) => exe,
            None => match ctx.find_executable(&root) {
                Some(exe) => exe,
                None => {
                    ctx.warn(ScanWarning::NoExecutable { path: root });
                    continue;
                }
            },
        };
        let name = name.unwrap_or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        let game = ctx.record(name, &root, exe, Platform::Gog);
        ctx.add(game);
    }
}

/// The registry's `exe` value, absolute or relative to the install, if it exists on disk.
fn registered_exe(root: &Path, exe: Option<&str>) -> Option<PathBuf> {
    let exe = Path::new(exe?.trim());
    let full = if exe.is_absolute() { exe.to_path_buf() } else { root.join(exe) };
    full.is_file().then_some(full)
}
