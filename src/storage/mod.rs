use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

use crate::config::{app_config_path, config_env_dirs, ConfigPathError, APP_DIR, SchemeConfig};
use crate::scheme::{Scheme, SchemeClassMap};

const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read preferences: {path}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write preferences: {path}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse preferences: {path}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize preferences")]
    Serialize(#[from] serde_json::Error),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// A durable string key-value medium.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-process store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Stores entries as a flat JSON object in a single file.
///
/// The file is re-read on every access so edits from other processes are
/// picked up.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn with_default_path() -> StorageResult<Self> {
        let (xdg_config_home, home) = config_env_dirs();
        Self::with_default_path_in(xdg_config_home.as_deref(), home.as_deref())
    }

    fn with_default_path_in(
        xdg_config_home: Option<&Path>,
        home: Option<&Path>,
    ) -> StorageResult<Self> {
        let path = app_config_path(APP_DIR, PREFERENCES_FILE, xdg_config_home, home).map_err(
            |error| match error {
                ConfigPathError::MissingHomeDirectory => StorageError::MissingHomeDirectory,
            },
        )?;
        Ok(Self::with_path(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> StorageResult<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let serialized = fs::read_to_string(&self.path).map_err(|source| StorageError::Read {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&serialized).map_err(|source| StorageError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    fn update_entries<F>(&self, update: F) -> StorageResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;
        }

        // A corrupt file is replaced rather than blocking every write.
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            Err(err @ StorageError::Parse { .. }) => {
                tracing::warn!(?err, "discarding corrupt preferences file");
                BTreeMap::new()
            }
            Err(err) => return Err(err),
        };
        update(&mut entries);

        let serialized = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, serialized).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.update_entries(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update_entries(|entries| {
            entries.remove(key);
        })
    }
}

/// Persists the user's explicit scheme as a class identifier.
///
/// Never fails: an unreadable, missing or foreign value loads as
/// [`Scheme::System`], and medium errors on write are logged.
pub struct PreferenceStore {
    medium: Box<dyn KeyValueStore>,
    classes: SchemeClassMap,
    key: String,
}

impl PreferenceStore {
    pub fn new(medium: Box<dyn KeyValueStore>, config: &SchemeConfig) -> Self {
        Self {
            medium,
            classes: config.classes().clone(),
            key: config.storage_key().to_string(),
        }
    }

    pub fn load(&self) -> Scheme {
        self.classes.scheme_for(self.stored_identifier().as_deref())
    }

    pub fn save(&self, scheme: Scheme) {
        self.store_identifier(self.classes.class_for(scheme));
    }

    /// The persisted identifier, if it is one of the configured classes.
    pub fn stored_identifier(&self) -> Option<String> {
        match self.medium.get(&self.key) {
            Ok(Some(value)) if self.classes.contains(&value) => Some(value),
            Ok(Some(value)) => {
                tracing::debug!(key = %self.key, %value, "ignoring foreign stored scheme");
                None
            }
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(key = %self.key, ?err, "failed to read stored scheme");
                None
            }
        }
    }

    /// Writes `identifier`, or removes the key for `None`. Identifiers outside
    /// the configured set are ignored.
    pub fn store_identifier(&self, identifier: Option<&str>) {
        let result = match identifier {
            None => self.medium.remove(&self.key),
            Some(class) if self.classes.contains(class) => self.medium.set(&self.key, class),
            Some(class) => {
                tracing::debug!(key = %self.key, class, "refusing to store foreign scheme class");
                return;
            }
        };
        if let Err(err) = result {
            tracing::warn!(key = %self.key, ?err, "failed to persist scheme preference");
        }
    }
}
