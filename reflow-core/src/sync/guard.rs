//! Fail-to-off output guards
//!
//! A guard owns an output and forces it off when the guard goes out of
//! scope: normal exit, early return, or a panic unwinding through the owner.
//! Heaters are only ever driven through a [`DutyGuard`].

use core::ops::{Deref, DerefMut};

use crate::traits::{DutyOutput, SwitchOutput};

/// Duty output forced to 0 % on drop
pub struct DutyGuard<D: DutyOutput> {
    output: D,
}

impl<D: DutyOutput> DutyGuard<D> {
    pub fn new(output: D) -> Self {
        Self { output }
    }
}

impl<D: DutyOutput> Deref for DutyGuard<D> {
    type Target = D;

    fn deref(&self) -> &D {
        &self.output
    }
}

impl<D: DutyOutput> DerefMut for DutyGuard<D> {
    fn deref_mut(&mut self) -> &mut D {
        &mut self.output
    }
}

impl<D: DutyOutput> Drop for DutyGuard<D> {
    fn drop(&mut self) {
        // Nothing left to report to
        let _ = self.output.set_duty(0);
    }
}

/// Switch output forced off on drop
pub struct SwitchGuard<S: SwitchOutput> {
    output: S,
}

impl<S: SwitchOutput> SwitchGuard<S> {
    pub fn new(output: S) -> Self {
        Self { output }
    }
}

impl<S: SwitchOutput> Deref for SwitchGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.output
    }
}

impl<S: SwitchOutput> DerefMut for SwitchGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.output
    }
}

impl<S: SwitchOutput> Drop for SwitchGuard<S> {
    fn drop(&mut self) {
        let _ = self.output.set_on(false);
    }
}
