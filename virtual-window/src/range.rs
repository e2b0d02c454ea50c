use alloc::vec;

use crate::{VirtualItem, VisibleRange};

/// Floor binary search over a non-decreasing sequence.
///
/// Returns the index of an exact match if one exists, otherwise the highest index whose value is
/// `<= target`. When `target` is below every value, returns `0`.
pub fn find_nearest_binary_search(
    low: usize,
    high: usize,
    get_value: impl Fn(usize) -> i128,
    target: i128,
) -> usize {
    // Signed bounds so `high` can step below `low` without wrapping.
    let mut low = low as i128;
    let mut high = high as i128;
    while low <= high {
        let middle = (low + high) / 2;
        let value = get_value(middle as usize);
        if value < target {
            low = middle + 1;
        } else if value > target {
            high = middle - 1;
        } else {
            return middle as usize;
        }
    }
    if low > 0 { (low - 1) as usize } else { 0 }
}

/// Finds the tight window of `measurements` intersecting
/// `[scroll_offset, scroll_offset + outer_size)`.
///
/// For multi-lane layouts the result is widened to whole lane-rows. `measurements` must not be
/// empty.
pub fn calculate_range<K>(
    measurements: &[VirtualItem<K>],
    outer_size: u32,
    scroll_offset: u64,
    lanes: usize,
) -> VisibleRange {
    debug_assert!(!measurements.is_empty(), "calculate_range on empty measurements");
    let lanes = lanes.max(1);
    let last_index = measurements.len().saturating_sub(1);

    if measurements.len() <= lanes {
        return VisibleRange {
            start_index: 0,
            end_index: last_index,
        };
    }

    let viewport_end = scroll_offset.saturating_add(outer_size as u64);
    let start = find_nearest_binary_search(
        0,
        last_index,
        |i| measurements[i].start as i128,
        scroll_offset as i128,
    );
    let mut end_index = start;

    if lanes == 1 {
        while end_index < last_index && measurements[end_index].end < viewport_end {
            end_index += 1;
        }
        return VisibleRange {
            start_index: start,
            end_index,
        };
    }

    let mut end_per_lane = vec![0u64; lanes];
    while end_index < last_index && end_per_lane.iter().any(|&end| end < viewport_end) {
        let item = &measurements[end_index];
        end_per_lane[item.lane % lanes] = item.end;
        end_index += 1;
    }

    // Walk backward until every lane has an item starting before the viewport.
    let mut start_per_lane = vec![viewport_end; lanes];
    let mut cursor = start as isize;
    while cursor >= 0 && start_per_lane.iter().any(|&s| s >= scroll_offset) {
        let item = &measurements[cursor as usize];
        start_per_lane[item.lane % lanes] = item.start;
        cursor -= 1;
    }

    let start_index = if cursor <= 0 {
        0
    } else {
        let cursor = cursor as usize;
        cursor - cursor % lanes
    };
    let end_index = last_index.min(end_index + (lanes - 1 - end_index % lanes));

    VisibleRange {
        start_index,
        end_index,
    }
}
