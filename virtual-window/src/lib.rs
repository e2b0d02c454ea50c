//! A headless virtualization engine in the spirit of TanStack Virtual.
//!
//! For host-side wiring (scroll container attachment, observers, the element scroll executor),
//! see the `virtual-window-adapter` crate.
//!
//! The engine maps a large ordered collection onto the few indexes that must be rendered inside
//! a viewport:
//! - a measurement cache turning estimated or measured sizes into absolute positions, optionally
//!   across several lanes (masonry columns)
//! - a range calculator finding the visible window for a scroll offset
//! - a pluggable range extractor choosing what to render (overscan, pinned rows)
//! - a scroll position controller with aligned scroll-to operations and layout shift
//!   compensation when items above the viewport change size
//!
//! It is UI-agnostic. A host is expected to provide:
//! - viewport size (`on_rect`)
//! - scroll offset (`on_offset` / `apply_scroll_event`)
//! - item size estimates and (optionally) element measurements
//! - a clock (`tick`)
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod collab;
mod error;
mod extract;
mod key;
mod measurements;
pub mod memo;
mod options;
mod range;
mod state;
mod types;
mod virtualizer;

#[cfg(test)]
mod tests;

pub use collab::{ItemElement, ResizeEntry, measure_element_default};
pub use error::{IndexAttributeError, OptionsError};
pub use extract::{IndexEmitter, default_range_extractor};
pub use memo::{ByAddress, Memo};
pub use options::{
    DEFAULT_INDEX_ATTRIBUTE, EstimateSizeFn, GetItemKeyFn, InitialOffset, MeasureElementFn,
    OnChangeCallback, RangeExtractor, RangeExtractorFn, ScrollToFn,
    ShouldAdjustScrollPositionOnItemSizeChangeCallback, VirtualizerOptions,
};
pub use range::{calculate_range, find_nearest_binary_search};
pub use state::ScrollState;
pub use types::{
    Align, ItemKey, Range, Rect, ScrollBehavior, ScrollDirection, ScrollToIndexOptions,
    ScrollToOffsetOptions, ScrollToOptions, VirtualItem, VisibleRange,
};
pub use virtualizer::Virtualizer;

#[doc(hidden)]
pub use key::KeyCacheKey;
