//! File-backed key-value store
//!
//! Each key lives in `<dir>/<key>.json`. Writes go to a temporary sibling
//! first and are renamed into place, so a crash never leaves a torn value.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use application::error::ApplicationError;
use application::ports::KeyValueStorePort;
use parking_lot::Mutex;
use tracing::{debug, instrument};

use super::error::map_io_error;

/// Key-value store keeping one file per key
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open a store in `dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `Persistence` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, ApplicationError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ApplicationError::Persistence(format!("cannot create {}: {e}", dir.display()))
        })?;
        debug!(dir = %dir.display(), "Opened file key-value store");
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the values
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, ApplicationError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if !valid {
            return Err(ApplicationError::Persistence(format!(
                "invalid storage key '{key}'"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStorePort for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, ApplicationError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io_error(key, &e)),
        }
    }

    #[instrument(skip(self, value), fields(value_len = value.len()))]
    fn set(&self, key: &str, value: &str) -> Result<(), ApplicationError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        let _guard = self.write_lock.lock();
        fs::write(&tmp, value).map_err(|e| map_io_error(key, &e))?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            map_io_error(key, &e)
        })
    }

    fn remove(&self, key: &str) -> Result<(), ApplicationError> {
        let path = self.path_for(key)?;
        let _guard = self.write_lock.lock();
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io_error(key, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_path_like_keys() {
        let dir = std::env::temp_dir();
        let store = FileKeyValueStore {
            dir,
            write_lock: Mutex::new(()),
        };

        for key in ["", "../etc/passwd", "a/b", ".hidden", "spaces here"] {
            assert!(store.path_for(key).is_err(), "{key:?} accepted");
        }
        assert!(store.path_for("voice-history").is_ok());
        assert!(store.path_for("voice_settings.v2").is_ok());
    }
}
