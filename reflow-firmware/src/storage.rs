//! Profile files compiled into the firmware
//!
//! Stands in for the SD card: files can be listed and read, writes are
//! refused with [`StorageError::ReadOnly`].

use heapless::{String, Vec};
use reflow_core::config::MAX_PATH_LEN;
use reflow_core::traits::{ProfileStorage, StorageError};

/// Path and contents of every embedded profile
pub static PROFILE_FILES: &[(&str, &str)] = &[
    ("/def_profile.prf", include_str!("../profiles/default.prf")),
    ("/leaded.prf", include_str!("../profiles/leaded.prf")),
];

/// Read-only storage over [`PROFILE_FILES`]
pub struct EmbeddedStorage;

impl ProfileStorage for EmbeddedStorage {
    fn list_profile_files<const N: usize>(
        &mut self,
        extension: &str,
    ) -> Result<Vec<String<MAX_PATH_LEN>, N>, StorageError> {
        let mut files = Vec::new();
        for (path, _) in PROFILE_FILES.iter().filter(|(p, _)| p.ends_with(extension)) {
            let path = String::try_from(*path).map_err(|_| StorageError::Io)?;
            if files.push(path).is_err() {
                break;
            }
        }
        Ok(files)
    }

    fn read_text(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let (_, text) = PROFILE_FILES
            .iter()
            .find(|(p, _)| *p == path)
            .ok_or(StorageError::NotFound)?;
        let bytes = text.as_bytes();
        let target = buf.get_mut(..bytes.len()).ok_or(StorageError::TooLarge)?;
        target.copy_from_slice(bytes);
        Ok(bytes.len())
    }

    fn write_text(&mut self, _path: &str, _bytes: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::ReadOnly)
    }
}
