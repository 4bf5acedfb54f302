//! JSON persistence for a [`Profile`] between runs.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::rewards::Profile;

#[derive(thiserror::Error, Debug)]
/// Errors raised while reading or writing a stored profile.
pub enum StoreError {
    /// The file could not be read or written.
    #[error("Cannot access {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file exists but does not hold a profile.
    #[error("Corrupt profile in {path}: {source}")]
    Corrupt {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// A profile file on disk.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Store backed by `path`. Nothing is touched until [`load_or_new`](Self::load_or_new)
    /// or [`save`](Self::save).
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Location of the profile file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored profile, or start a fresh one named `name` when the file does not
    /// exist yet. A given `name` also renames a stored profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read and
    /// [`StoreError::Corrupt`] if it does not parse. A corrupt file is left untouched.
    pub fn load_or_new(&self, name: Option<&str>) -> Result<Profile, StoreError> {
        if !self.path.exists() {
            info!("No profile at {}, starting a new one", self.path.display());
            return Ok(Profile::new(name.unwrap_or("you")));
        }

        let text = fs::read_to_string(&self.path).map_err(|source| self.io(source))?;
        let mut profile: Profile =
            serde_json::from_str(&text).map_err(|source| StoreError::Corrupt {
                path: self.path.clone(),
                source,
            })?;
        if let Some(name) = name {
            name.clone_into(&mut profile.name);
        }

        info!(
            points = profile.points,
            records = profile.records.len(),
            "Loaded profile from {}",
            self.path.display()
        );
        Ok(profile)
    }

    /// Write `profile` to disk, replacing the previous file in one step.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file or its directory cannot be written.
    pub fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| self.io(source))?;
        }

        let content = serde_json::to_string_pretty(profile).map_err(|source| {
            StoreError::Corrupt {
                path: self.path.clone(),
                source,
            }
        })?;
        let mut tmp_path = self.path.clone().into_os_string();
        tmp_path.push(".tmp");
        let tmp_path = PathBuf::from(tmp_path);

        fs::write(&tmp_path, content).map_err(|source| self.io(source))?;
        fs::rename(&tmp_path, &self.path).map_err(|source| self.io(source))?;
        debug!(records = profile.records.len(), "Saved profile to {}", self.path.display());
        Ok(())
    }

    fn io(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
