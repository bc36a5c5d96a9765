use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{CoreError, WalletAddress};

/// Key under which the connected address is stored.
pub const SESSION_KEY: &str = "walletPublicKey";

/// Durable single-entry storage for the connected wallet address.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<WalletAddress>, CoreError>;

    fn save(&self, address: &WalletAddress) -> Result<(), CoreError>;
}

/// JSON file holding `{"walletPublicKey": "<address>"}`.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `session.json` under the application home.
    pub fn in_home(home: &Path) -> Self {
        Self::new(home.join("session.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, CoreError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(error) => Err(error.into()),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<WalletAddress>, CoreError> {
        let entries = self.read_entries()?;
        entries
            .get(SESSION_KEY)
            .map(|raw| WalletAddress::parse(raw))
            .transpose()
            .map_err(CoreError::from)
    }

    fn save(&self, address: &WalletAddress) -> Result<(), CoreError> {
        // Keep unrelated keys that may share the file.
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(
                    path = %self.path.display(),
                    "session file unreadable, overwriting it: {error}"
                );
                BTreeMap::new()
            }
        };
        entries.insert(String::from(SESSION_KEY), address.as_str().to_owned());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        Ok(())
    }
}

/// In-process store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    address: Mutex<Option<WalletAddress>>,
}

impl MemorySessionStore {
    pub fn with_address(address: WalletAddress) -> Self {
        Self {
            address: Mutex::new(Some(address)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<WalletAddress>, CoreError> {
        Ok(self
            .address
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default())
    }

    fn save(&self, address: &WalletAddress) -> Result<(), CoreError> {
        if let Ok(mut guard) = self.address.lock() {
            *guard = Some(address.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

    #[test]
    fn missing_file_means_not_connected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(dir.path());
        assert_eq!(store.load().expect("load"), None);
    }

    #[test]
    fn saved_address_uses_well_known_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(&dir.path().join("nested"));
        let address = WalletAddress::parse(ADDRESS).expect("valid address");

        store.save(&address).expect("save");

        let raw = fs::read_to_string(store.path()).expect("file written");
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw).expect("json");
        assert_eq!(entries.get("walletPublicKey").map(String::as_str), Some(ADDRESS));
        assert_eq!(store.load().expect("load"), Some(address));
    }

    #[test]
    fn corrupt_address_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(dir.path());
        fs::write(store.path(), r#"{"walletPublicKey":"not-a-key"}"#).expect("write");

        assert!(matches!(store.load(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn save_keeps_other_keys_and_replaces_unreadable_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileSessionStore::in_home(dir.path());
        let address = WalletAddress::parse(ADDRESS).expect("valid address");

        fs::write(store.path(), r#"{"theme":"dark"}"#).expect("write");
        store.save(&address).expect("save");
        let raw = fs::read_to_string(store.path()).expect("file written");
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw).expect("json");
        assert_eq!(entries.get("theme").map(String::as_str), Some("dark"));

        fs::write(store.path(), "{not json").expect("write");
        store.save(&address).expect("save over corrupt file");
        assert_eq!(store.load().expect("load"), Some(address));
    }
}
