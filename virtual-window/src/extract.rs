//! Render window extraction: turns the tight visible [`Range`] into the indexes to render.

use crate::Range;

/// Default extractor: the visible window widened by `overscan` on both sides.
///
/// Emits `max(start - overscan, 0) ..= min(end + overscan, count - 1)`.
pub fn default_range_extractor(range: Range, emit: &mut dyn FnMut(usize)) {
    if range.count == 0 {
        return;
    }
    let start = range.start_index.saturating_sub(range.overscan);
    let end = range
        .end_index
        .saturating_add(range.overscan)
        .min(range.count - 1);
    for i in start..=end {
        emit(i);
    }
}

/// Forwards indexes to an extractor's `emit` callback, keeping the output well formed.
///
/// Indexes past `range.count`, repeats and indexes lower than the previous one are dropped.
/// Drops other than plain repeats are logged at `warn`. The engine wraps every extractor in one,
/// and custom extractors can use it to mix pinned rows with the overscanned window.
pub struct IndexEmitter<'a> {
    range: Range,
    /// Lowest index still accepted.
    floor: usize,
    sink: &'a mut dyn FnMut(usize),
}

impl<'a> IndexEmitter<'a> {
    pub fn new(range: Range, sink: &'a mut dyn FnMut(usize)) -> Self {
        Self {
            range,
            floor: 0,
            sink,
        }
    }

    pub fn range(&self) -> Range {
        self.range
    }

    /// Returns whether `index` was forwarded.
    pub fn emit(&mut self, index: usize) -> bool {
        if index >= self.range.count {
            vwarn!(index, count = self.range.count, "extractor emitted index past count");
            return false;
        }
        if index < self.floor {
            if index + 1 != self.floor {
                vwarn!(index, floor = self.floor, "extractor emitted index out of order");
            }
            return false;
        }
        self.floor = index + 1;
        (self.sink)(index);
        true
    }

    /// Emits `start..=end`, clamped to the item count.
    pub fn emit_range(&mut self, start: usize, end: usize) {
        let Some(last) = self.range.count.checked_sub(1) else {
            return;
        };
        (start.max(self.floor)..=end.min(last)).for_each(|i| {
            self.emit(i);
        });
    }

    pub fn emit_visible(&mut self) {
        self.emit_range(self.range.start_index, self.range.end_index);
    }

    /// The default extractor's window: visible items plus `overscan` on each side.
    pub fn emit_overscanned(&mut self) {
        let Range {
            start_index,
            end_index,
            overscan,
            ..
        } = self.range;
        self.emit_range(
            start_index.saturating_sub(overscan),
            end_index.saturating_add(overscan),
        );
    }
}
