use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

use crate::alarm::Alarm;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("couldn't read alarm file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("alarm file {path} is not valid JSON")]
    CorruptData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("couldn't write alarm file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// reads and writes the alarm file, a JSON array of alarms.
/// nothing else touches that file
#[derive(Debug, Clone)]
pub struct AlarmStore {
    path: PathBuf,
}

impl AlarmStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `None` when the platform has no config directory for us
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "chime")
            .map(|dirs| dirs.config_dir().join("alarms.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// a missing file is a fresh install, not an error
    pub fn load(&self) -> Result<Vec<Alarm>, StoreError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no alarm file at {}, starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&json).map_err(|source| StoreError::CorruptData {
            path: self.path.clone(),
            source,
        })
    }

    /// overwrites the file with the whole collection.
    /// writes go to a temp file first and get renamed into place, so a
    /// crash mid-write can't leave a truncated file behind
    pub fn save(&self, alarms: &[Alarm]) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let json = serde_json::to_string_pretty(alarms)
            .map_err(|e| write_err(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(write_err)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(write_err)?;
        fs::rename(&tmp, &self.path).map_err(write_err)?;
        info!("saved {} alarms to {}", alarms.len(), self.path.display());
        Ok(())
    }
}
