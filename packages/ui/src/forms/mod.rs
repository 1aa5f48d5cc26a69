//! Form state and validation, kept free of rendering so it can be unit tested.
//!
//! | Module | Form |
//! |--------|------|
//! | [`registration`] | Profile completion after first login |
//! | [`contribution`] | Recording a contribution to a chama |
//! | [`create_chama`] | The four-step chama creation wizard |

pub mod contribution;
pub mod create_chama;
pub mod registration;

use std::collections::BTreeMap;

/// Per-field validation messages for a form whose fields are `F`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrors<F: Ord> {
    errors: BTreeMap<F, String>,
}

impl<F: Ord> Default for FieldErrors<F> {
    fn default() -> Self {
        Self {
            errors: BTreeMap::new(),
        }
    }
}

impl<F: Ord + Copy> FieldErrors<F> {
    pub fn set(&mut self, field: F, message: impl Into<String>) {
        self.errors.insert(field, message.into());
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    /// Drop the message for one field, as the user starts correcting it.
    pub fn clear(&mut self, field: F) {
        self.errors.remove(&field);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = F> + '_ {
        self.errors.keys().copied()
    }
}

/// Admits one submission at a time. Claimed in the event handler, before any task
/// is spawned, so a second click cannot slip in while the first is still queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlight(bool);

impl InFlight {
    /// Claim the slot. `false` while a submission is already running.
    pub fn try_begin(&mut self) -> bool {
        if self.0 {
            return false;
        }
        self.0 = true;
        true
    }

    pub fn finish(&mut self) {
        self.0 = false;
    }

    pub fn is_active(self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_flight_admits_one_submission() {
        let mut latch = InFlight::default();
        assert!(latch.try_begin());
        assert!(!latch.try_begin());
        assert!(latch.is_active());
        latch.finish();
        assert!(!latch.is_active());
        assert!(latch.try_begin());
    }
}
