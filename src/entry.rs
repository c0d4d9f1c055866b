//! The (value, priority) pair stored by every queue in this crate

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A value together with the priority it was enqueued at.
///
/// Entries are stored by value. The value is carried opaquely; only the
/// priority takes part in ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry<R, P = u32> {
    pub value: R,
    pub priority: P,
}

impl<R, P> Entry<R, P> {
    pub fn new(value: R, priority: P) -> Self {
        Self { value, priority }
    }

    /// Splits the entry back into its `(value, priority)` pair
    pub fn into_pair(self) -> (R, P) {
        (self.value, self.priority)
    }

    /// Borrowed view as `(&value, &priority)`
    pub fn as_pair(&self) -> (&R, &P) {
        (&self.value, &self.priority)
    }
}

impl<R, P> From<(R, P)> for Entry<R, P> {
    fn from((value, priority): (R, P)) -> Self {
        Self::new(value, priority)
    }
}
