//! Shared bus lock

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// Mutex around everything attached to the shared hardware bus
///
/// The closure passed to [`BusLock::with_bus_lock`] runs inside the lock and
/// the lock is released on every exit path, including a panic unwinding out
/// of the closure. There is no retry and no timeout: keep the protected
/// section to a single bus transaction.
pub struct BusLock<M: RawMutex, T> {
    inner: Mutex<M, RefCell<T>>,
}

impl<M: RawMutex, T> BusLock<M, T> {
    pub const fn new(bus: T) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(bus)),
        }
    }

    /// Run `f` with exclusive access to the bus
    ///
    /// # Panics
    ///
    /// Panics if called re-entrantly from inside `f`.
    pub fn with_bus_lock<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_with_bus_lock_returns_value() {
        let bus: BusLock<NoopRawMutex, u32> = BusLock::new(41);
        let value = bus.with_bus_lock(|b| {
            *b += 1;
            *b
        });
        assert_eq!(value, 42);
        assert_eq!(bus.with_bus_lock(|b| *b), 42);
    }
}
