//! Trust store layout.
//!
//! The trust store is a base directory holding three sibling directories:
//!
//! ```text
//! <base>/ca/        CA roots        <id>.ca.key, <id>.ca.pem
//! <base>/private/   leaf keys       <id>.key
//! <base>/public/    leaf certs      <id>.pem
//! ```
//!
//! All of them are created owner-only on first use. Entries are only ever
//! added; nothing here prunes them.

use crate::error::{CertiffixError, Result};
use crate::storage::entry::{Role, Store, TrustStoreEntry};
use crate::template::mangle::mangle;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Directory name of the CA root store.
pub const CA_DIR: &str = "ca";
/// Directory name of the leaf private key store.
pub const PRIVATE_DIR: &str = "private";
/// Directory name of the leaf public certificate store.
pub const PUBLIC_DIR: &str = "public";

/// Permissions applied to every trust store directory.
pub const DIR_MODE: u32 = 0o700;

/// Certificate file extensions offered when listing a store.
const CERT_EXTENSIONS: [&str; 2] = ["pem", "crt"];

/// Where the trust store and temporary artifacts live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustStoreConfig {
    /// Base directory of the trust store.
    pub base_dir: PathBuf,
    /// Directory for temporary configuration and signing request files.
    pub temp_dir: PathBuf,
}

impl TrustStoreConfig {
    /// A trust store rooted at `base_dir`, using the system temp directory.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            temp_dir: std::env::temp_dir(),
        }
    }

    /// Override the temporary artifact directory.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// The default base directory, `~/.config/certiffix`.
    pub fn default_base_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(".config").join("certiffix"))
            .ok_or_else(|| {
                CertiffixError::InvalidInput(
                    "cannot locate the home directory; pass --store".to_string(),
                )
            })
    }

    /// Directory of the CA root store.
    pub fn ca_dir(&self) -> PathBuf {
        self.base_dir.join(CA_DIR)
    }

    /// Directory of the leaf private key store.
    pub fn private_dir(&self) -> PathBuf {
        self.base_dir.join(PRIVATE_DIR)
    }

    /// Directory of the leaf public certificate store.
    pub fn public_dir(&self) -> PathBuf {
        self.base_dir.join(PUBLIC_DIR)
    }
}

/// Derive the storage identifier for a primary DNS name.
pub fn derive_identifier(primary_name: &str) -> String {
    mangle(primary_name)
}

/// The private key path belonging to a CA public certificate.
///
/// `<id>.ca.pem` maps to `<id>.ca.key`; any other certificate file maps to
/// the same stem with a `.key` extension.
pub fn ca_private_key_for(public_cert: &Path) -> PathBuf {
    let ca_pem = Store::CaRoot.suffix(Role::PublicCert);
    let ca_key = Store::CaRoot.suffix(Role::PrivateKey);

    match public_cert.to_str().and_then(|p| p.strip_suffix(ca_pem)) {
        Some(stem) => PathBuf::from(format!("{}{}", stem, ca_key)),
        None => public_cert.with_extension("key"),
    }
}

/// A trust store on disk.
#[derive(Debug, Clone)]
pub struct TrustStore {
    config: TrustStoreConfig,
}

impl TrustStore {
    /// Open a trust store, creating its directories if needed.
    ///
    /// A failure to create the directories is logged and otherwise ignored so
    /// a read-only store can still be listed. Writes into a missing directory
    /// fail later with a [`CertiffixError::FileIo`] error.
    pub fn open(config: TrustStoreConfig) -> Self {
        let store = Self { config };
        if let Err(e) = store.ensure() {
            warn!("Could not create trust store directories: {}", e);
        }
        store
    }

    /// Create the base, CA, private and public directories (owner-only).
    pub fn ensure(&self) -> Result<()> {
        for dir in [
            self.config.base_dir.clone(),
            self.config.ca_dir(),
            self.config.private_dir(),
            self.config.public_dir(),
        ] {
            create_private_dir(&dir)?;
        }
        debug!("Trust store ready at {}", self.config.base_dir.display());
        Ok(())
    }

    /// The configuration this store was opened with.
    pub fn config(&self) -> &TrustStoreConfig {
        &self.config
    }

    /// Directory holding files of `role` in `store`.
    pub fn dir(&self, store: Store, role: Role) -> PathBuf {
        match (store, role) {
            (Store::CaRoot, _) => self.config.ca_dir(),
            (Store::Leaf, Role::PrivateKey) => self.config.private_dir(),
            (Store::Leaf, Role::PublicCert) => self.config.public_dir(),
        }
    }

    /// Path of the `role` file for `identifier` in `store`.
    pub fn path_for(&self, store: Store, identifier: &str, role: Role) -> PathBuf {
        self.dir(store, role).join(store.file_name(identifier, role))
    }

    /// The full entry for `identifier` in `store`.
    pub fn entry(&self, store: Store, identifier: &str) -> TrustStoreEntry {
        TrustStoreEntry {
            identifier: identifier.to_string(),
            private_key: self.path_for(store, identifier, Role::PrivateKey),
            public_cert: self.path_for(store, identifier, Role::PublicCert),
        }
    }

    /// Resolve a CA given either a path to its certificate or its name.
    ///
    /// A reference containing a path separator or ending in a certificate
    /// extension is a path and is returned unchanged, existing or not. Anything
    /// else is a name, mangled and looked up in the CA store.
    pub fn resolve_ca(&self, reference: &str) -> PathBuf {
        let as_path = PathBuf::from(reference);
        let has_separator =
            reference.contains('/') || reference.contains(std::path::MAIN_SEPARATOR);
        if has_separator || has_cert_extension(&as_path) || as_path.is_file() {
            return as_path;
        }
        self.path_for(Store::CaRoot, &derive_identifier(reference), Role::PublicCert)
    }

    /// List the certificates available in `store`, sorted by identifier.
    ///
    /// A store directory that does not exist lists as empty.
    pub fn list_available(&self, store: Store) -> Result<Vec<TrustStoreEntry>> {
        let dir = self.dir(store, Role::PublicCert);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let read_dir = fs::read_dir(&dir).map_err(|e| CertiffixError::file_io(&dir, e))?;
        let public_suffix = store.suffix(Role::PublicCert);
        let mut entries = Vec::new();

        for item in read_dir {
            let item = item.map_err(|e| CertiffixError::file_io(&dir, e))?;
            let path = item.path();
            if !path.is_file() || !has_cert_extension(&path) {
                continue;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let identifier = match file_name.strip_suffix(public_suffix) {
                Some(stem) => stem.to_string(),
                None => match path.file_stem().and_then(|s| s.to_str()) {
                    Some(stem) => derive_identifier(stem),
                    None => continue,
                },
            };

            let private_key = match store {
                Store::CaRoot => ca_private_key_for(&path),
                Store::Leaf => self.path_for(Store::Leaf, &identifier, Role::PrivateKey),
            };

            entries.push(TrustStoreEntry {
                identifier,
                private_key,
                public_cert: path,
            });
        }

        entries.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(entries)
    }
}

fn has_cert_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| CERT_EXTENSIONS.contains(&e))
}

fn create_private_dir(dir: &Path) -> Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }

    builder
        .create(dir)
        .map_err(|e| CertiffixError::file_io(dir, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_store(temp_dir: &TempDir) -> TrustStore {
        TrustStore::open(TrustStoreConfig::new(temp_dir.path().join("certiffix")))
    }

    #[test]
    fn test_open_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        assert!(store.config().ca_dir().is_dir());
        assert!(store.config().private_dir().is_dir());
        assert!(store.config().public_dir().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_directories_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        for dir in [
            store.config().ca_dir(),
            store.config().private_dir(),
            store.config().public_dir(),
        ] {
            let mode = fs::metadata(&dir).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, DIR_MODE, "{}", dir.display());
        }
    }

    #[test]
    fn test_open_tolerates_unwritable_base() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let store = TrustStore::open(TrustStoreConfig::new(blocker.join("store")));
        assert!(store.ensure().is_err());
        assert!(store.list_available(Store::CaRoot).unwrap().is_empty());
    }

    #[test]
    fn test_path_for() {
        let store = TrustStore {
            config: TrustStoreConfig::new("/base"),
        };

        assert_eq!(
            store.path_for(Store::CaRoot, "root_test", Role::PrivateKey),
            PathBuf::from("/base/ca/root_test.ca.key")
        );
        assert_eq!(
            store.path_for(Store::CaRoot, "root_test", Role::PublicCert),
            PathBuf::from("/base/ca/root_test.ca.pem")
        );
        assert_eq!(
            store.path_for(Store::Leaf, "svc_test", Role::PrivateKey),
            PathBuf::from("/base/private/svc_test.key")
        );
        assert_eq!(
            store.path_for(Store::Leaf, "svc_test", Role::PublicCert),
            PathBuf::from("/base/public/svc_test.pem")
        );
    }

    #[test]
    fn test_derive_identifier() {
        assert_eq!(derive_identifier("root.test"), "root_test");
        assert_eq!(derive_identifier("Example, Inc!!"), "example_inc");
    }

    #[test]
    fn test_ca_private_key_for() {
        assert_eq!(
            ca_private_key_for(Path::new("/base/ca/root_test.ca.pem")),
            PathBuf::from("/base/ca/root_test.ca.key")
        );
        assert_eq!(
            ca_private_key_for(Path::new("/elsewhere/root.crt")),
            PathBuf::from("/elsewhere/root.key")
        );
    }

    #[test]
    fn test_list_available_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        let ca_dir = store.config().ca_dir();

        fs::write(ca_dir.join("zeta_test.ca.pem"), "cert").unwrap();
        fs::write(ca_dir.join("zeta_test.ca.key"), "key").unwrap();
        fs::write(ca_dir.join("alpha_test.ca.pem"), "cert").unwrap();
        fs::write(ca_dir.join("notes.txt"), "ignored").unwrap();
        fs::write(ca_dir.join("alpha_test.ca.srl"), "01").unwrap();

        let entries = store.list_available(Store::CaRoot).unwrap();
        let ids: Vec<&str> = entries.iter().map(|e| e.identifier.as_str()).collect();

        assert_eq!(ids, vec!["alpha_test", "zeta_test"]);
        assert!(!entries[0].has_private_key());
        assert!(entries[1].has_private_key());
        assert_eq!(entries[1].private_key, ca_dir.join("zeta_test.ca.key"));
    }

    #[test]
    fn test_list_available_leaf_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        fs::write(store.config().public_dir().join("svc_test.pem"), "cert").unwrap();

        let entries = store.list_available(Store::Leaf).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].private_key,
            store.config().private_dir().join("svc_test.key")
        );
    }

    #[test]
    fn test_resolve_ca_by_name_and_path() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);
        let expected = store.config().ca_dir().join("root_test.ca.pem");

        assert_eq!(store.resolve_ca("root.test"), expected);
        assert_eq!(store.resolve_ca("Root Test"), expected);

        let outside = temp_dir.path().join("custom.pem");
        fs::write(&outside, "cert").unwrap();
        assert_eq!(store.resolve_ca(outside.to_str().unwrap()), outside);
    }

    #[test]
    fn test_resolve_ca_keeps_missing_paths() {
        let temp_dir = TempDir::new().unwrap();
        let store = open_store(&temp_dir);

        let given = "/home/me/certs/typo_root.ca.pem";
        assert_eq!(store.resolve_ca(given), PathBuf::from(given));
        assert_eq!(
            store.resolve_ca("root_test.ca.pem"),
            PathBuf::from("root_test.ca.pem")
        );
        assert_eq!(store.resolve_ca("certs/root"), PathBuf::from("certs/root"));
    }
}
