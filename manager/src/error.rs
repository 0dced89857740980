use std::path::PathBuf;

use thiserror::Error;

/// A scan step that degraded but did not stop the scan.
///
/// Warnings are collected in a `ScanReport` and forwarded as scan events.
/// Nothing in the scanner returns them as a hard failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanWarning {
    #[error("registry key {key} could not be read: {message}")]
    Registry { key: String, message: String },

    #[error("permission denied while reading {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to read {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("malformed manifest {}: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("no game executable found in {}", path.display())]
    NoExecutable { path: PathBuf },

    #[error("OptiScaler.ini in {} unusable ({reason}), status inferred from DLLs", dir.display())]
    ConfigFallback { dir: PathBuf, reason: String },
}

impl ScanWarning {
    /// Maps an I/O error on `path` to the matching warning variant.
    pub fn from_io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        let path = path.into();
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => ScanWarning::PermissionDenied { path },
            _ => ScanWarning::Io {
                path,
                message: err.to_string(),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("invalid JSON in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn permission_denied_maps_to_its_own_warning() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(
            ScanWarning::from_io(r"C:\XboxGames", &err),
            ScanWarning::PermissionDenied {
                path: PathBuf::from(r"C:\XboxGames")
            }
        );
    }

    #[test]
    fn other_io_errors_keep_their_message() {
        let err = io::Error::new(io::ErrorKind::NotFound, "gone");
        match ScanWarning::from_io("steamapps", &err) {
            ScanWarning::Io { path, message } => {
                assert_eq!(path, PathBuf::from("steamapps"));
                assert_eq!(message, "gone");
            }
            other => panic!("unexpected warning: {:?}", other),
        }
    }
}
