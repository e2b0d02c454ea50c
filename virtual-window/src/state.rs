use crate::ScrollDirection;

/// A lightweight snapshot of the scroll position controller.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollState {
    pub offset: u64,
    pub is_scrolling: bool,
    /// `None` while idle.
    pub direction: Option<ScrollDirection>,
    /// Cumulative correction issued to keep visible content stable while items before the
    /// viewport change size. Reset whenever the host reports a new offset.
    pub pending_adjustment: i64,
}

impl ScrollState {
    /// The offset the viewport will settle at once pending adjustments land.
    pub fn effective_offset(&self) -> u64 {
        apply_delta(self.offset, self.pending_adjustment)
    }
}

pub(crate) fn apply_delta(offset: u64, delta: i64) -> u64 {
    if delta >= 0 {
        offset.saturating_add(delta as u64)
    } else {
        offset.saturating_sub(delta.unsigned_abs())
    }
}
