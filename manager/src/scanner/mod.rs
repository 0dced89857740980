//! Storefront scanning.
//!
//! Each storefront is probed in turn; one failing never stops the others.
//! Anything that degrades a step is reported as a [`ScanWarning`] and the
//! scan carries on. Cancellation is cooperative and keeps partial results.

mod epic;
mod folders;
mod gog;
mod steam;
mod xbox;

pub use epic::{parse_manifest, EpicManifest};

use log::{debug, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ScanWarning;
use crate::exe_finder::ExeHeuristics;
use crate::game::{GameRecord, Platform};
use crate::ini_config::DEFAULT_PRESET_TOLERANCE;
use crate::mod_files::{self, ModFileTable};
use crate::registry::{RegistryReader, SystemRegistry};

/// Shared cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanProgress {
    pub completed: usize,
    pub total: usize,
    pub current_platform: Option<Platform>,
    pub games_found: usize,
    pub message: String,
}

impl ScanProgress {
    pub fn percentage(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f32 / self.total as f32 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Progress(ScanProgress),
    GameDiscovered(GameRecord),
    Warning(ScanWarning),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub games: Vec<GameRecord>,
    pub warnings: Vec<ScanWarning>,
    pub cancelled: bool,
}

/// Where each storefront keeps its games.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformRoots {
    /// Steam install folder. `None` looks it up in the registry.
    pub steam: Option<PathBuf>,
    pub epic_manifests: PathBuf,
    pub xbox: PathBuf,
    /// Extra GOG folder scanned alongside the registry entries.
    pub gog_library: Option<PathBuf>,
    pub ea: Vec<PathBuf>,
    pub ubisoft: Vec<PathBuf>,
}

impl PlatformRoots {
    pub fn from_system_dirs(program_data: &Path, program_files: &Path, program_files_x86: &Path) -> Self {
        let ubisoft_games = |base: &Path| base.join("Ubisoft").join("Ubisoft Game Launcher").join("games");
        let mut ubisoft = vec![ubisoft_games(program_files)];
        if program_files_x86 != program_files {
            ubisoft.push(ubisoft_games(program_files_x86));
        }

        Self {
            steam: None,
            epic_manifests: program_data
                .join("Epic")
                .join("EpicGamesLauncher")
                .join("Data")
                .join("Manifests"),
            xbox: PathBuf::from(r"C:\XboxGames"),
            gog_library: None,
            ea: vec![program_files.join("EA Games"), program_files.join("Origin Games")],
            ubisoft,
        }
    }
}

impl Default for PlatformRoots {
    fn default() -> Self {
        Self::from_system_dirs(
            Path::new(r"C:\ProgramData"),
            Path::new(r"C:\Program Files"),
            Path::new(r"C:\Program Files (x86)"),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Storefronts to scan, in order.
    pub platforms: Vec<Platform>,
    /// Folders verified as `Manual` games before any storefront.
    pub custom_paths: Vec<PathBuf>,
    pub roots: PlatformRoots,
    pub heuristics: ExeHeuristics,
    pub mod_files: ModFileTable,
    pub preset_tolerance: f32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            platforms: Platform::STOREFRONTS.to_vec(),
            custom_paths: Vec::new(),
            roots: PlatformRoots::default(),
            heuristics: ExeHeuristics::default(),
            mod_files: ModFileTable::default(),
            preset_tolerance: DEFAULT_PRESET_TOLERANCE,
        }
    }
}

pub struct GameScanner {
    settings: ScanSettings,
    registry: Box<dyn RegistryReader>,
}

impl GameScanner {
    pub fn new(settings: ScanSettings, registry: Box<dyn RegistryReader>) -> Self {
        Self { settings, registry }
    }

    pub fn with_system_registry(settings: ScanSettings) -> Self {
        Self::new(settings, Box::new(SystemRegistry))
    }

    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Runs the manual step (when custom paths exist) and every configured storefront.
    pub fn scan_all(&self, cancel: &CancelToken, sink: &mut dyn FnMut(ScanEvent)) -> ScanReport {
        let mut steps = Vec::new();
        if !self.settings.custom_paths.is_empty() {
            steps.push(Platform::Manual);
        }
        steps.extend(self.settings.platforms.iter().copied().filter(|p| *p != Platform::Manual));

        let total = steps.len();
        let mut ctx = ScanContext::new(self, cancel, sink);

        if steps.is_empty() {
            ctx.progress(0, 0, None, "No platforms enabled for scanning".to_string());
            return ctx.finish();
        }

        ctx.progress(0, total, None, "Starting scan...".to_string());
        let mut completed = 0;
        for platform in steps {
            if ctx.is_cancelled() {
                break;
            }
            ctx.progress(completed, total, Some(platform), format!("Scanning {}...", platform));

            let before = ctx.games.len();
            self.run_platform(platform, &mut ctx);
            info!("{}: {} games", platform, ctx.games.len() - before);

            completed += 1;
            ctx.progress(completed, total, Some(platform), format!("Completed {}", platform));
        }

        let message = if ctx.is_cancelled() {
            format!("Scan cancelled - {} games found", ctx.games.len())
        } else {
            format!("Scan complete - {} games found", ctx.games.len())
        };
        ctx.progress(completed, total, None, message);
        ctx.finish()
    }

    /// Scans a single storefront (or the custom paths for `Manual`).
    pub fn scan_platform(&self, platform: Platform) -> ScanReport {
        let cancel = CancelToken::new();
        let mut ignore = |_: ScanEvent| {};
        let mut ctx = ScanContext::new(self, &cancel, &mut ignore);
        self.run_platform(platform, &mut ctx);
        ctx.finish()
    }

    /// Treats `path` as a manually added game folder.
    ///
    /// `None` when the folder doesn't exist or holds no usable executable.
    pub fn verify_path(&self, path: &Path) -> Option<GameRecord> {
        let cancel = CancelToken::new();
        let mut ignore = |_: ScanEvent| {};
        let mut ctx = ScanContext::new(self, &cancel, &mut ignore);
        manual_record(&mut ctx, path)
    }

    /// Re-inspects the executable directory of `game` and returns the updated record.
    pub fn refresh_mod_status(&self, game: &GameRecord) -> GameRecord {
        let inspection = mod_files::inspect(
            &game.executable_directory,
            &self.settings.mod_files,
            self.settings.preset_tolerance,
        );
        if let Some(w) = &inspection.warning {
            debug!("{}", w);
        }
        game.with_mod_status(inspection.status)
    }

    fn run_platform(&self, platform: Platform, ctx: &mut ScanContext<'_>) {
        match platform {
            Platform::Steam => steam::scan(ctx),
            Platform::Epic => epic::scan(ctx),
            Platform::Xbox => xbox::scan(ctx),
            Platform::Gog => gog::scan(ctx),
            Platform::Ea => folders::scan_roots(ctx, &self.settings.roots.ea, Platform::Ea),
            Platform::Ubisoft => folders::scan_roots(ctx, &self.settings.roots.ubisoft, Platform::Ubisoft),
            Platform::Manual => {
                for path in &self.settings.custom_paths {
                    if ctx.is_cancelled() {
                        break;
                    }
                    match manual_record(ctx, path) {
                        Some(game) => ctx.add(game),
                        None => ctx.warn(ScanWarning::NoExecutable { path: path.clone() }),
                    }
                }
            }
            Platform::Unknown => debug!("Nothing to scan for platform Unknown"),
        }
    }
}

fn manual_record(ctx: &mut ScanContext<'_>, path: &Path) -> Option<GameRecord> {
    if !path.is_dir() {
        debug!("Custom path {} is not a directory", path.display());
        return None;
    }
    let exe = ctx.find_executable(path)?;
    let name = exe
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Some(ctx.record(name, path, exe, Platform::Manual))
}

/// Runs `scanner.scan_all` on a blocking worker.
///
/// Events stream through the returned receiver while the scan runs; the
/// handle yields the final report.
pub fn spawn_scan(
    scanner: GameScanner,
    cancel: CancelToken,
) -> (JoinHandle<ScanReport>, mpsc::UnboundedReceiver<ScanEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::task::spawn_blocking(move || {
        let mut forward = |event: ScanEvent| {
            // The receiver may be gone; the scan still finishes.
            let _ = tx.send(event);
        };
        scanner.scan_all(&cancel, &mut forward)
    });
    (handle, rx)
}

/// Per-scan state shared by the storefront modules.
pub(crate) struct ScanContext<'a> {
    scanner: &'a GameScanner,
    cancel: &'a CancelToken,
    sink: &'a mut dyn FnMut(ScanEvent),
    seen: HashSet<String>,
    games: Vec<GameRecord>,
    warnings: Vec<ScanWarning>,
}

impl<'a> ScanContext<'a> {
    fn new(scanner: &'a GameScanner, cancel: &'a CancelToken, sink: &'a mut dyn FnMut(ScanEvent)) -> Self {
        Self {
            scanner,
            cancel,
            sink,
            seen: HashSet::new(),
            games: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn settings(&self) -> &'a ScanSettings {
        &self.scanner.settings
    }

    pub(crate) fn registry(&self) -> &'a dyn RegistryReader {
        self.scanner.registry.as_ref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub(crate) fn warn(&mut self, warning: ScanWarning) {
        warn!("{}", warning);
        (self.sink)(ScanEvent::Warning(warning.clone()));
        self.warnings.push(warning);
    }

    fn warn_all(&mut self, warnings: Vec<ScanWarning>) {
        for w in warnings {
            self.warn(w);
        }
    }

    fn progress(&mut self, completed: usize, total: usize, platform: Option<Platform>, message: String) {
        debug!("{}", message);
        let progress = ScanProgress {
            completed,
            total,
            current_platform: platform,
            games_found: self.games.len(),
            message,
        };
        (self.sink)(ScanEvent::Progress(progress));
    }

    /// Sorted subdirectories of `dir`. An unreadable `dir` yields a warning and nothing.
    pub(crate) fn subdirs(&mut self, dir: &Path) -> Vec<PathBuf> {
        match fs::read_dir(dir) {
            Ok(entries) => {
                let mut dirs: Vec<PathBuf> = entries
                    .flatten()
                    .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
                    .map(|e| e.path())
                    .collect();
                dirs.sort();
                dirs
            }
            Err(e) => {
                self.warn(ScanWarning::from_io(dir, &e));
                Vec::new()
            }
        }
    }

    pub(crate) fn find_executable(&mut self, root: &Path) -> Option<PathBuf> {
        let mut warnings = Vec::new();
        let exe = self.settings().heuristics.find_game_executable(root, &mut warnings);
        self.warn_all(warnings);
        exe
    }

    pub(crate) fn find_xbox_executable(&mut self, search_root: &Path, folder_name: &str) -> Option<PathBuf> {
        let mut warnings = Vec::new();
        let exe = self
            .settings()
            .heuristics
            .find_xbox_executable(search_root, folder_name, &mut warnings);
        self.warn_all(warnings);
        exe
    }

    /// Builds a record and inspects its executable directory for the mods.
    pub(crate) fn record(
        &mut self,
        name: impl Into<String>,
        install_root: &Path,
        exe: PathBuf,
        platform: Platform,
    ) -> GameRecord {
        let settings = self.settings();
        let game = GameRecord::new(name, install_root, exe, platform);
        let inspection = mod_files::inspect(
            &game.executable_directory,
            &settings.mod_files,
            settings.preset_tolerance,
        );
        if let Some(w) = inspection.warning {
            self.warn(w);
        }
        game.with_mod_status(inspection.status)
    }

    pub(crate) fn add(&mut self, game: GameRecord) {
        if !self.seen.insert(game.id()) {
            debug!("Skipping duplicate {}", game.id());
            return;
        }
        debug!("Found {} game {} at {}", game.platform, game.name, game.executable_path.display());
        (self.sink)(ScanEvent::GameDiscovered(game.clone()));
        self.games.push(game);
    }

    fn finish(self) -> ScanReport {
        ScanReport {
            cancelled: self.cancel.is_cancelled(),
            games: self.games,
            warnings: self.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_handles_empty_total() {
        let p = ScanProgress {
            completed: 0,
            total: 0,
            current_platform: None,
            games_found: 0,
            message: String::new(),
        };
        assert_eq!(p.percentage(), 0.0);
        let p = ScanProgress { completed: 1, total: 4, ..p };
        assert_eq!(p.percentage(), 25.0);
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn default_roots_cover_both_program_files() {
        let roots = PlatformRoots::from_system_dirs(
            Path::new("/pd"),
            Path::new("/pf"),
            Path::new("/pf86"),
        );
        assert_eq!(roots.ubisoft.len(), 2);
        assert_eq!(roots.ea[1], Path::new("/pf/Origin Games"));
        assert!(roots.epic_manifests.ends_with("Manifests"));
    }
}
