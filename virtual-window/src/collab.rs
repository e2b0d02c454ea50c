//! Interfaces of the outside world the engine talks to.
//!
//! The engine never owns UI objects. Rendered items are seen through [`ItemElement`] only for the
//! duration of a `measure_element` call, and scrolls are handed to a [`crate::ScrollToFn`].

/// A rendered item element, as seen by the measurement path.
pub trait ItemElement {
    /// Reads an attribute of the element (used to find the item index).
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Whether the element is still part of the rendered tree.
    fn is_connected(&self) -> bool;

    /// The element's border-box size along the virtualized axis.
    fn size(&self, horizontal: bool) -> u32;
}

/// A size notification delivered by the host's resize observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResizeEntry {
    /// Border-box size along the virtualized axis, when the host reports one.
    pub border_box_size: Option<u32>,
}

/// Default element measurer: the entry's border-box size when present, else the element's.
pub fn measure_element_default(
    element: &dyn ItemElement,
    entry: Option<&ResizeEntry>,
    horizontal: bool,
) -> u32 {
    entry
        .and_then(|e| e.border_box_size)
        .unwrap_or_else(|| element.size(horizontal))
}
