use log::debug;

use super::ScanContext;
use crate::game::Platform;

pub(super) fn scan(ctx: &mut ScanContext<'_>) {
    let root = ctx.settings().roots.xbox.clone();
    if !root.is_dir() {
        debug!("Xbox games folder {} does not exist", root.display());
        return;
    }

    for game_dir in ctx.subdirs(&root) {
        if ctx.is_cancelled() {
            break;
        }
        let folder = game_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if ctx.settings().heuristics.is_xbox_skip_folder(&folder) {
            debug!("Skipping {}", game_dir.display());
            continue;
        }

        // Packaged games keep their files under Content
        let content = game_dir.join("Content");
        let search = if content.is_dir() { content } else { game_dir.clone() };

        match ctx.find_xbox_executable(&search, &folder) {
            Some(exe) => {
                let game = ctx.record(folder, &game_dir, exe, Platform::Xbox);
                ctx.add(game);
            }
            None => debug!("No valid executable found in {}", game_dir.display()),
        }
    }
}
