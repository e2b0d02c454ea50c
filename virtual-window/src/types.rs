/// Which part of an item should line up with which part of the viewport in a scroll-to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Auto,
}

/// How the scroll executor should perform a scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollBehavior {
    #[default]
    Auto,
    Smooth,
    Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// Size of the scroll container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size along the virtualized axis.
    pub fn main(&self, horizontal: bool) -> u32 {
        if horizontal { self.width } else { self.height }
    }
}

/// A positioned item of the measurement cache.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VirtualItem<K = ItemKey> {
    pub key: K,
    pub index: usize,
    /// Start offset in the scroll axis (includes `scroll_margin` and `padding_start`).
    pub start: u64,
    /// Always `start + size`.
    pub end: u64,
    /// Size in the scroll axis (excludes `gap`).
    pub size: u32,
    /// Lane (column for vertical lists, row for horizontal ones).
    pub lane: usize,
}

pub type ItemKey = u64;

/// The tight visible window produced by the range calculator.
///
/// Both ends are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleRange {
    pub start_index: usize,
    pub end_index: usize,
}

/// Input of a range extractor: the visible window plus overscan and item count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    pub start_index: usize,
    pub end_index: usize, // inclusive, visible range (no overscan)
    pub overscan: usize,
    pub count: usize,
}

/// Options passed to the scroll executor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollToOptions {
    /// Additive correction the executor applies on top of the requested offset.
    pub adjustments: Option<i64>,
    pub behavior: Option<ScrollBehavior>,
}

/// Options of `scroll_to_offset` / `scroll_by`. Alignment defaults to [`Align::Start`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollToOffsetOptions {
    pub align: Align,
    pub behavior: Option<ScrollBehavior>,
}

impl Default for ScrollToOffsetOptions {
    fn default() -> Self {
        Self::align(Align::Start)
    }
}

impl ScrollToOffsetOptions {
    pub fn align(align: Align) -> Self {
        Self {
            align,
            behavior: None,
        }
    }

    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }
}

/// Options of `scroll_to_index`. Alignment defaults to [`Align::Auto`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollToIndexOptions {
    pub align: Align,
    pub behavior: Option<ScrollBehavior>,
}

impl ScrollToIndexOptions {
    pub fn align(align: Align) -> Self {
        Self {
            align,
            behavior: None,
        }
    }

    pub fn with_behavior(mut self, behavior: ScrollBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }
}
