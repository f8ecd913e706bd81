//! Profile files on storage
//!
//! Lists, loads and persists profiles through a [`ProfileStorage`] backend.
//! Every failure is reported into the shared [`ErrorChannel`] before it is
//! returned, so the status display can show it without the caller's help.

use embassy_sync::blocking_mutex::raw::RawMutex;
use heapless::{String, Vec};

use super::model::{parse_profile, ReflowProfile};
use crate::config::{StorageConfig, MAX_PATH_LEN};
use crate::error::{ErrorChannel, FormatErrorKind, ReflowError};
use crate::traits::{ProfileStorage, StorageError};

/// Largest profile file accepted (bytes)
pub const PROFILE_BUF_LEN: usize = 512;

/// Maximum profile files returned by a listing
pub const MAX_PROFILE_FILES: usize = 16;

/// Profile files available on one storage backend
pub struct ProfileLibrary<'a, S, M: RawMutex> {
    storage: S,
    config: StorageConfig,
    errors: &'a ErrorChannel<M>,
}

impl<'a, S: ProfileStorage, M: RawMutex> ProfileLibrary<'a, S, M> {
    pub fn new(storage: S, config: StorageConfig, errors: &'a ErrorChannel<M>) -> Self {
        Self {
            storage,
            config,
            errors,
        }
    }

    /// List profile files with the configured extension
    pub fn list(&mut self) -> Result<Vec<String<MAX_PATH_LEN>, MAX_PROFILE_FILES>, ReflowError> {
        let extension = self.config.extension.clone();
        let result = self.storage.list_profile_files(&extension);
        self.report(result.map_err(ReflowError::from))
    }

    /// Load and parse one profile file
    pub fn load(&mut self, path: &str) -> Result<ReflowProfile, ReflowError> {
        let result = self.read_profile(path);
        self.report(result)
    }

    /// Load the default profile
    ///
    /// A missing default is reported as [`ReflowError::ProfileMissing`].
    pub fn load_default(&mut self) -> Result<ReflowProfile, ReflowError> {
        let path = self.config.default_profile.clone();
        match self.read_profile(&path) {
            Err(ReflowError::StorageUnavailable) if self.default_missing(&path) => {
                self.errors
                    .set("Default profile not found", Some(ReflowError::ProfileMissing));
                Err(ReflowError::ProfileMissing)
            }
            result => self.report(result),
        }
    }

    /// Persist `profile` as the default profile
    pub fn store_default(&mut self, profile: &ReflowProfile) -> Result<(), ReflowError> {
        let mut text: String<PROFILE_BUF_LEN> = String::new();
        let result = match profile.write_text(&mut text) {
            Ok(()) => self
                .storage
                .write_text(&self.config.default_profile, text.as_bytes())
                .map_err(ReflowError::from),
            Err(_) => Err(ReflowError::ProfileFormat {
                line: 1,
                kind: FormatErrorKind::TooManyEntries,
            }),
        };
        self.report(result)
    }

    fn read_profile(&mut self, path: &str) -> Result<ReflowProfile, ReflowError> {
        let mut buf = [0u8; PROFILE_BUF_LEN];
        let len = self.storage.read_text(path, &mut buf)?;
        let text = core::str::from_utf8(&buf[..len]).map_err(|_| ReflowError::ProfileFormat {
            line: 1,
            kind: FormatErrorKind::InvalidUtf8,
        })?;
        parse_profile(text)
    }

    /// Distinguish "no default file" from an unmounted medium
    fn default_missing(&mut self, path: &str) -> bool {
        let mut probe = [0u8; 1];
        matches!(
            self.storage.read_text(path, &mut probe),
            Err(StorageError::NotFound)
        )
    }

    fn report<T>(&self, result: Result<T, ReflowError>) -> Result<T, ReflowError> {
        if let Err(error) = &result {
            self.errors.record(*error);
        }
        result
    }
}
