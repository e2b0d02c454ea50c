use virtual_window::{KeyCacheKey, Rect, ScrollBehavior, ScrollToOptions, Virtualizer};

/// The host's scroll container.
///
/// Positions are in the container's native coordinates: a horizontal right-to-left container
/// reports and accepts negative positions.
pub trait ScrollElement: Send + Sync {
    /// Current size of the visible area.
    fn client_rect(&self) -> Rect;

    fn scroll_position(&self, horizontal: bool) -> i64;

    fn scroll_to(&self, position: i64, horizontal: bool, behavior: Option<ScrollBehavior>);
}

/// Converts a native scroll position to the engine's offset.
pub fn logical_offset(position: i64, horizontal: bool, is_rtl: bool) -> u64 {
    let position = if horizontal && is_rtl {
        position.saturating_neg()
    } else {
        position
    };
    position.max(0) as u64
}

/// Converts an engine offset to a native scroll position.
pub fn native_position(offset: i64, horizontal: bool, is_rtl: bool) -> i64 {
    if horizontal && is_rtl {
        offset.saturating_neg()
    } else {
        offset
    }
}

/// Reads the element's offset along the virtualized axis.
pub fn element_offset(element: &dyn ScrollElement, horizontal: bool, is_rtl: bool) -> u64 {
    logical_offset(element.scroll_position(horizontal), horizontal, is_rtl)
}

/// Default scroll executor: scrolls `element` to `offset + adjustments`.
pub fn element_scroll<K: KeyCacheKey>(
    element: &dyn ScrollElement,
    offset: u64,
    options: ScrollToOptions,
    v: &Virtualizer<K>,
) {
    let horizontal = v.options().horizontal;
    let target = (offset as i64).saturating_add(options.adjustments.unwrap_or(0));
    atrace!(offset, target, horizontal, "element_scroll");
    element.scroll_to(
        native_position(target, horizontal, v.options().is_rtl),
        horizontal,
        options.behavior,
    );
}
