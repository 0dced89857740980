use log::debug;
use std::path::PathBuf;

use super::ScanContext;
use crate::game::Platform;

/// Treats every subfolder of each root as one game install.
pub(super) fn scan_roots(ctx: &mut ScanContext<'_>, roots: &[PathBuf], platform: Platform) {
    for root in roots {
        if ctx.is_cancelled() {
            break;
        }
        if !root.is_dir() {
            debug!("{} folder {} does not exist", platform, root.display());
            continue;
        }

        for game_dir in ctx.subdirs(root) {
            if ctx.is_cancelled() {
                break;
            }
            let Some(exe) = ctx.find_executable(&game_dir) else {
                debug!("No executable in {}", game_dir.display());
                continue;
            };
            let name = game_dir
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let game = ctx.record(name, &game_dir, exe, platform);
            ctx.add(game);
        }
    }
}
