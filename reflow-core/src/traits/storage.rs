//! Profile storage trait

use heapless::{String, Vec};

use crate::config::MAX_PATH_LEN;
use crate::error::ReflowError;

/// Errors reported by a storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Card absent or filesystem not mounted
    NotMounted,
    /// No such file
    NotFound,
    /// File larger than the caller's buffer
    TooLarge,
    /// Medium is read-only
    ReadOnly,
    /// Any other I/O failure
    Io,
}

impl From<StorageError> for ReflowError {
    fn from(_: StorageError) -> Self {
        ReflowError::StorageUnavailable
    }
}

/// Storage holding profile files (SD card, flash, or built-in)
pub trait ProfileStorage {
    /// List files ending with `extension`, in storage order
    fn list_profile_files<const N: usize>(
        &mut self,
        extension: &str,
    ) -> Result<Vec<String<MAX_PATH_LEN>, N>, StorageError>;

    /// Read a file into `buf`, returning the number of bytes read
    fn read_text(&mut self, path: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Create or replace a file
    fn write_text(&mut self, path: &str, bytes: &[u8]) -> Result<(), StorageError>;
}
