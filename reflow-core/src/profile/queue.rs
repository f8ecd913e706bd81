//! Runtime step queue

use heapless::Deque;

use super::model::{ProfileEntry, ReflowProfile, MAX_ENTRIES};
use crate::error::ReflowError;

/// FIFO of profile stages consumed by the control engine
///
/// Rebuilt from the profile on every reflow start.
#[derive(Debug, Clone, Default)]
pub struct StepQueue {
    steps: Deque<ProfileEntry, MAX_ENTRIES>,
}

impl StepQueue {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            steps: Deque::new(),
        }
    }

    /// Take the next stage
    pub fn pop(&mut self) -> Option<ProfileEntry> {
        self.steps.pop_front()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn clear(&mut self) {
        self.steps.clear();
    }
}

/// Copy a profile's entries into a fresh queue
///
/// Fails with [`ReflowError::ProfileMissing`] when there is no profile or it
/// has no entries.
pub fn build_step_queue(profile: Option<&ReflowProfile>) -> Result<StepQueue, ReflowError> {
    let profile = profile.ok_or(ReflowError::ProfileMissing)?;
    if profile.is_empty() {
        return Err(ReflowError::ProfileMissing);
    }

    let mut queue = StepQueue::new();
    for entry in profile.entries() {
        // Both sides share MAX_ENTRIES so this cannot overflow
        let _ = queue.steps.push_back(*entry);
    }
    Ok(queue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_profile() {
        assert_eq!(
            build_step_queue(None).unwrap_err(),
            ReflowError::ProfileMissing
        );

        let empty = ReflowProfile::new("empty").unwrap();
        assert_eq!(
            build_step_queue(Some(&empty)).unwrap_err(),
            ReflowError::ProfileMissing
        );
    }

    #[test]
    fn test_queue_is_fifo_copy() {
        let profile = ReflowProfile::from_entries(
            "p",
            &[ProfileEntry::new(160, 80, 3), ProfileEntry::new(220, 55, 2)],
        )
        .unwrap();

        let mut queue = build_step_queue(Some(&profile)).unwrap();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(ProfileEntry::new(160, 80, 3)));
        assert_eq!(queue.pop(), Some(ProfileEntry::new(220, 55, 2)));
        assert_eq!(queue.pop(), None);

        // Consuming the queue leaves the profile untouched
        assert_eq!(profile.entries().len(), 2);
        let again = build_step_queue(Some(&profile)).unwrap();
        assert_eq!(again.len(), 2);
    }
}
