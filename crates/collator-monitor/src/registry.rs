use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read collator registry {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse collator registry {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("collator registry {path}: name for {address} is not a string")]
    InvalidEntry { path: PathBuf, address: String },
}

/// Known collator addresses and their display names for one chain.
///
/// Entries keep the order they were declared in, which is what operator
/// name resolution scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressRegistry {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AddressRegistry {
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let contents = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let map: Map<String, Value> =
            serde_json::from_str(&contents).map_err(|source| RegistryError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let mut entries = Vec::with_capacity(map.len());
        for (address, name) in map {
            match name {
                Value::String(name) => entries.push((address, name)),
                _ => {
                    return Err(RegistryError::InvalidEntry {
                        path: path.to_path_buf(),
                        address,
                    })
                }
            }
        }

        Ok(Self::from_entries(entries))
    }

    /// Builds a registry from `(address, name)` pairs. A repeated address
    /// keeps its first position and takes the later name.
    pub fn from_entries<I, A, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (A, N)>,
        A: Into<String>,
        N: Into<String>,
    {
        let mut registry = Self::default();
        for (address, name) in entries {
            let address = address.into();
            let name = name.into();
            match registry.index.get(&address) {
                Some(&position) => registry.entries[position].1 = name,
                None => {
                    registry.index.insert(address.clone(), registry.entries.len());
                    registry.entries.push((address, name));
                }
            }
        }
        registry
    }

    pub fn name_of(&self, address: &str) -> Option<&str> {
        self.index
            .get(address)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn contains(&self, address: &str) -> bool {
        self.index.contains_key(address)
    }

    /// `(address, name)` pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(address, name)| (address.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_registry(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collators.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_preserves_declared_order() {
        let (_dir, path) = write_registry(
            r#"{
                "15X2eHehrexKqz6Bs6fQTjptP2ndn39eYdQTeREVeRk32p54": "ZULU",
                "14xSXydBVvuMMaNduDXwWcckt3BziSB8Sa7o34Jt9z2aMGxX": "DPSTK",
                "13Jpq4n3PXXaSAbJTMmFD78mXAzs8PzgUUQd5ve8saw7HQS5": "ALPHA"
            }"#,
        );

        let registry = AddressRegistry::load(&path).unwrap();
        let names: Vec<&str> = registry.iter().map(|(_, name)| name).collect();
        assert_eq!(names, vec!["ZULU", "DPSTK", "ALPHA"]);
        assert_eq!(registry.len(), 3);
        assert_eq!(
            registry.name_of("14xSXydBVvuMMaNduDXwWcckt3BziSB8Sa7o34Jt9z2aMGxX"),
            Some("DPSTK")
        );
    }

    #[test]
    fn test_load_rejects_non_string_names() {
        let (_dir, path) = write_registry(r#"{"ADDR1": "OK", "ADDR2": 42}"#);
        let err = AddressRegistry::load(&path).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidEntry { ref address, .. } if address == "ADDR2"));
    }

    #[test]
    fn test_load_rejects_malformed_json() {
        let (_dir, path) = write_registry("[\"ADDR1\"]");
        assert!(matches!(
            AddressRegistry::load(&path),
            Err(RegistryError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            AddressRegistry::load(&dir.path().join("nope.json")),
            Err(RegistryError::Io { .. })
        ));
    }

    #[test]
    fn test_duplicate_address_keeps_first_position() {
        let registry =
            AddressRegistry::from_entries([("A", "one"), ("B", "two"), ("A", "three")]);
        let pairs: Vec<(&str, &str)> = registry.iter().collect();
        assert_eq!(pairs, vec![("A", "three"), ("B", "two")]);
        assert!(registry.contains("B"));
        assert!(!registry.contains("C"));
    }
}
