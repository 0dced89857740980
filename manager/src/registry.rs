use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    LocalMachine,
    CurrentUser,
}

impl Hive {
    pub fn prefix(&self) -> &'static str {
        match self {
            Hive::LocalMachine => "HKLM",
            Hive::CurrentUser => "HKCU",
        }
    }
}

/// Read-only view of the registry.
///
/// A missing key or value is `Ok(None)` / an empty list. Only real access
/// failures are errors.
pub trait RegistryReader: Send + Sync {
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> io::Result<Option<String>>;
    fn subkeys(&self, hive: Hive, key: &str) -> io::Result<Vec<String>>;
}

/// The machine's registry. Always empty on non-Windows hosts.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRegistry;

#[cfg(windows)]
mod imp {
    use super::Hive;
    use std::io;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};
    use winreg::RegKey;

    fn open(hive: Hive, key: &str) -> io::Result<Option<RegKey>> {
        let root = match hive {
            Hive::LocalMachine => RegKey::predef(HKEY_LOCAL_MACHINE),
            Hive::CurrentUser => RegKey::predef(HKEY_CURRENT_USER),
        };
        match root.open_subkey_with_flags(key, KEY_READ) {
            Ok(k) => Ok(Some(k)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn read_string(hive: Hive, key: &str, value: &str) -> io::Result<Option<String>> {
        let Some(k) = open(hive, key)? else {
            return Ok(None);
        };
        match k.get_value::<String, _>(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn subkeys(hive: Hive, key: &str) -> io::Result<Vec<String>> {
        let Some(k) = open(hive, key)? else {
            return Ok(Vec::new());
        };
        k.enum_keys().collect()
    }
}

#[cfg(not(windows))]
mod imp {
    use super::Hive;
    use std::io;

    pub fn read_string(_hive: Hive, _key: &str, _value: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    pub fn subkeys(_hive: Hive, _key: &str) -> io::Result<Vec<String>> {
        Ok(Vec::new())
    }
}

impl RegistryReader for SystemRegistry {
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> io::Result<Option<String>> {
        imp::read_string(hive, key, value)
    }

    fn subkeys(&self, hive: Hive, key: &str) -> io::Result<Vec<String>> {
        imp::subkeys(hive, key)
    }
}
