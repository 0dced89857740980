#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use optiscaler_manager::registry::{Hive, RegistryReader};
use optiscaler_manager::scanner::PlatformRoots;
use optiscaler_manager::{GameScanner, Platform, ScanSettings};

/// Creates `path` (and its parents) with a few bytes of content.
pub fn touch(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, b"MZ").unwrap();
    path.to_path_buf()
}

/// In-memory registry keyed case-insensitively.
#[derive(Default)]
pub struct FakeRegistry {
    values: HashMap<(Hive, String, String), String>,
    subkeys: HashMap<(Hive, String), Vec<String>>,
}

impl FakeRegistry {
    pub fn with_value(mut self, hive: Hive, key: &str, value: &str, data: &str) -> Self {
        self.values.insert(
            (hive, key.to_lowercase(), value.to_lowercase()),
            data.to_string(),
        );
        self
    }

    pub fn with_subkey(mut self, hive: Hive, key: &str, subkey: &str) -> Self {
        self.subkeys
            .entry((hive, key.to_lowercase()))
            .or_default()
            .push(subkey.to_string());
        self
    }
}

impl RegistryReader for FakeRegistry {
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> io::Result<Option<String>> {
        Ok(self
            .values
            .get(&(hive, key.to_lowercase(), value.to_lowercase()))
            .cloned())
    }

    fn subkeys(&self, hive: Hive, key: &str) -> io::Result<Vec<String>> {
        Ok(self
            .subkeys
            .get(&(hive, key.to_lowercase()))
            .cloned()
            .unwrap_or_default())
    }
}

/// Every storefront root points at a missing folder under `base`.
pub fn isolated_settings(base: &Path, platforms: &[Platform]) -> ScanSettings {
    let missing = base.join("missing");
    ScanSettings {
        platforms: platforms.to_vec(),
        roots: PlatformRoots {
            steam: None,
            epic_manifests: missing.join("epic"),
            xbox: missing.join("xbox"),
            gog_library: None,
            ea: vec![missing.join("ea")],
            ubisoft: vec![missing.join("ubisoft")],
        },
        ..ScanSettings::default()
    }
}

pub fn scanner(settings: ScanSettings) -> GameScanner {
    GameScanner::new(settings, Box::new(FakeRegistry::default()))
}
