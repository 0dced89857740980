pub mod cache;
pub mod config;
pub mod error;
pub mod exe_finder;
pub mod game;
pub mod game_path;
pub mod ini_config;
pub mod mod_files;
pub mod registry;
pub mod scanner;

pub use cache::SnapshotStore;
pub use config::AppConfig;
pub use error::{ConfigError, ScanWarning};
pub use game::{GameRecord, ModStatus, Platform};
pub use ini_config::{read_config, write_config, ModConfig};
pub use scanner::{spawn_scan, CancelToken, GameScanner, ScanEvent, ScanProgress, ScanReport, ScanSettings};
