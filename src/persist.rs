//! Where the exposed part of a store goes between sessions. The store only ever talks to a
//! [`Persistence`], it has no idea whether that is a URL fragment, a file or nothing at all.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;

use crate::Result;

/// Storage for the exposed query string of a [`crate::ParameterStore`]
pub trait Persistence {
    /// Persist the given exposed string, replacing whatever was stored before
    fn save(&mut self, state: &str) -> Result<()>;
    /// The last persisted string, empty if nothing was ever saved
    fn stored_string(&self) -> Result<String>;
}

impl<T: Persistence + ?Sized> Persistence for Box<T> {
    fn save(&mut self, state: &str) -> Result<()> {
        (**self).save(state)
    }

    fn stored_string(&self) -> Result<String> {
        (**self).stored_string()
    }
}

/// Drops every save and always reads back nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPersistence;

impl Persistence for NoPersistence {
    fn save(&mut self, _: &str) -> Result<()> {
        Ok(())
    }

    fn stored_string(&self) -> Result<String> {
        Ok(String::new())
    }
}

/// Keeps state the way a page keeps it in its URL fragment
#[derive(Debug, Default, Clone)]
pub struct FragmentStore {
    state: String,
}

impl FragmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing fragment, with or without its leading `#`
    pub fn from_fragment(fragment: &str) -> Self {
        Self {
            state: fragment.trim_start_matches('#').to_string(),
        }
    }

    /// The fragment as it would appear in a URL
    pub fn fragment(&self) -> String {
        if self.state.is_empty() {
            String::new()
        } else {
            format!("#{}", self.state)
        }
    }
}

impl Persistence for FragmentStore {
    fn save(&mut self, state: &str) -> Result<()> {
        self.state = state.trim_start_matches('#').to_string();
        Ok(())
    }

    fn stored_string(&self) -> Result<String> {
        Ok(self.state.clone())
    }
}

/// Keeps state in a single file, a missing file means nothing was saved yet
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for FileStore {
    fn save(&mut self, state: &str) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        debug!("Saving state to {}", self.path.display());
        fs::write(&self.path, state)?;
        Ok(())
    }

    fn stored_string(&self) -> Result<String> {
        match fs::read_to_string(&self.path) {
            Ok(state) => Ok(state.trim_end().to_string()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}
