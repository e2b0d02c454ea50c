use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::collab::{ItemElement, ResizeEntry};
use crate::virtualizer::Virtualizer;
use crate::{ItemKey, OptionsError, Range, Rect, ScrollToOptions, VirtualItem};

/// Estimated size of the item at an index, used until the item is measured.
pub type EstimateSizeFn = dyn Fn(usize) -> u32 + Send + Sync;

/// Stable identity of the item at an index.
pub type GetItemKeyFn<K> = dyn Fn(usize) -> K + Send + Sync;

/// A callback fired when a virtualizer state update occurs.
///
/// The second argument is `is_synchronous`: `true` while a scroll is in progress, `false` for
/// updates that do not come from a scroll tick (measurements, option changes).
pub type OnChangeCallback<K> = Arc<dyn Fn(&Virtualizer<K>, bool) + Send + Sync>;

/// A hook that decides whether to compensate the scroll position when an item size changes.
///
/// Receives the item as it was positioned before the change and the size delta.
pub type ShouldAdjustScrollPositionOnItemSizeChangeCallback<K> =
    Arc<dyn Fn(&Virtualizer<K>, &VirtualItem<K>, i64) -> bool + Send + Sync>;

/// A callback that emits virtual item indexes for a given visible range.
///
/// Contract:
/// - `emit(i)` must be called with `i < range.count`.
/// - The emitted indexes must be sorted ascending; duplicates are allowed but ignored.
/// - The output must be a pure function of `range`.
///
/// Tip: use [`crate::IndexEmitter`] to enforce the contract.
pub type RangeExtractor = Arc<RangeExtractorFn>;

pub type RangeExtractorFn = dyn Fn(Range, &mut dyn FnMut(usize)) + Send + Sync;

/// The scroll executor: performs a scroll to `offset`, applying `adjustments` additively.
pub type ScrollToFn<K> = Arc<dyn Fn(u64, ScrollToOptions, &Virtualizer<K>) + Send + Sync>;

/// Measures a rendered element along the virtualized axis.
pub type MeasureElementFn<K> =
    Arc<dyn Fn(&dyn ItemElement, Option<&ResizeEntry>, &Virtualizer<K>) -> u32 + Send + Sync>;

pub const DEFAULT_INDEX_ATTRIBUTE: &str = "data-index";

/// Initial scroll offset configuration.
#[derive(Clone)]
pub enum InitialOffset {
    /// A fixed initial offset.
    Value(u64),
    /// A lazily evaluated initial offset provider.
    Provider(Arc<dyn Fn() -> u64 + Send + Sync>),
}

impl InitialOffset {
    pub(crate) fn resolve(&self) -> u64 {
        match self {
            Self::Value(v) => *v,
            Self::Provider(f) => f(),
        }
    }
}

impl Default for InitialOffset {
    fn default() -> Self {
        Self::Value(0)
    }
}

impl core::fmt::Debug for InitialOffset {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

/// Configuration for [`crate::Virtualizer`].
///
/// Cheap to clone: closures are stored in `Arc`s, so adapters can tweak a few fields and call
/// `Virtualizer::set_options` every frame. Replacing a closure (a new `Arc`) invalidates every
/// derived value that depends on it; cloning one does not.
pub struct VirtualizerOptions<K = ItemKey> {
    pub count: usize,
    pub estimate_size: Arc<EstimateSizeFn>,
    pub get_item_key: Arc<GetItemKeyFn<K>>,

    /// Optional index selection hook. `None` uses [`crate::default_range_extractor`].
    pub range_extractor: Option<RangeExtractor>,

    /// Scroll executor. `None` applies scroll requests directly to the virtualizer's own offset,
    /// which suits hosts that render straight from `scroll_offset()`.
    pub scroll_to_fn: Option<ScrollToFn<K>>,

    /// Element measurer. `None` uses [`crate::measure_element_default`].
    pub measure_element: Option<MeasureElementFn<K>>,

    /// Enables/disables the virtualizer. When disabled, query methods return empty results.
    pub enabled: bool,

    pub overscan: usize,

    /// Virtualize along the horizontal axis.
    pub horizontal: bool,

    /// Right-to-left layout; only affects how horizontal scroll executors map offsets.
    pub is_rtl: bool,

    /// Container size to assume before the first rect observation.
    pub initial_rect: Option<Rect>,

    /// Padding before the first item.
    pub padding_start: u32,
    /// Padding after the last item.
    pub padding_end: u32,

    /// Padding respected by scroll-to operations at the start of the viewport.
    pub scroll_padding_start: u32,
    /// Padding respected by scroll-to operations at the end of the viewport.
    pub scroll_padding_end: u32,

    /// Where the list starts inside the scroll element (e.g. below a header in window scrolling).
    pub scroll_margin: u32,

    /// Space between consecutive items of a lane.
    pub gap: u32,

    /// Number of lanes (columns for vertical lists). Must be at least 1.
    pub lanes: usize,

    pub initial_offset: InitialOffset,

    /// Previously captured measurements used to seed the size cache of a fresh virtualizer.
    pub initial_measurements_cache: Arc<[VirtualItem<K>]>,

    pub on_change: Option<OnChangeCallback<K>>,

    /// Trust the host to report the end of scrolling (`on_offset(_, false)`).
    ///
    /// When `false`, `tick` clears `is_scrolling` after `is_scrolling_reset_delay_ms` without
    /// scroll notifications.
    pub use_scrollend_event: bool,

    pub is_scrolling_reset_delay_ms: u64,

    /// Overrides the scroll compensation decision made when an item's size changes.
    ///
    /// The default compensates when the item starts before the effective scroll offset.
    pub should_adjust_scroll_position_on_item_size_change:
        Option<ShouldAdjustScrollPositionOnItemSizeChangeCallback<K>>,

    /// Attribute of rendered elements holding the item index.
    pub index_attribute: Arc<str>,

    /// Upper bound on deferred `scroll_to_index` retries. `None` retries until convergence.
    pub max_scroll_to_index_retries: Option<u32>,

    /// Logs memo timings (requires the `tracing` feature).
    pub debug: bool,
}

impl<K> Clone for VirtualizerOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            estimate_size: Arc::clone(&self.estimate_size),
            get_item_key: Arc::clone(&self.get_item_key),
            range_extractor: self.range_extractor.clone(),
            scroll_to_fn: self.scroll_to_fn.clone(),
            measure_element: self.measure_element.clone(),
            enabled: self.enabled,
            overscan: self.overscan,
            horizontal: self.horizontal,
            is_rtl: self.is_rtl,
            initial_rect: self.initial_rect,
            padding_start: self.padding_start,
            padding_end: self.padding_end,
            scroll_padding_start: self.scroll_padding_start,
            scroll_padding_end: self.scroll_padding_end,
            scroll_margin: self.scroll_margin,
            gap: self.gap,
            lanes: self.lanes,
            initial_offset: self.initial_offset.clone(),
            initial_measurements_cache: Arc::clone(&self.initial_measurements_cache),
            on_change: self.on_change.clone(),
            use_scrollend_event: self.use_scrollend_event,
            is_scrolling_reset_delay_ms: self.is_scrolling_reset_delay_ms,
            should_adjust_scroll_position_on_item_size_change: self
                .should_adjust_scroll_position_on_item_size_change
                .clone(),
            index_attribute: Arc::clone(&self.index_attribute),
            max_scroll_to_index_retries: self.max_scroll_to_index_retries,
            debug: self.debug,
        }
    }
}

impl VirtualizerOptions<ItemKey> {
    /// Creates options for a list keyed by index (`ItemKey = u64`).
    ///
    /// `estimate_size(i)` should return the estimated item size in the scroll axis (e.g. row
    /// height for vertical lists). The estimate is used until an item is measured.
    pub fn new(count: usize, estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static) -> Self {
        Self::new_with_key(count, estimate_size, |i| i as u64)
    }
}

impl<K> VirtualizerOptions<K> {
    /// Creates options with a custom key mapping.
    ///
    /// Use this when measurements should follow items across reordering/replacement:
    /// `get_item_key(i)` should return a stable identity for the item at index `i`.
    pub fn new_with_key(
        count: usize,
        estimate_size: impl Fn(usize) -> u32 + Send + Sync + 'static,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        Self {
            count,
            estimate_size: Arc::new(estimate_size),
            get_item_key: Arc::new(get_item_key),
            range_extractor: None,
            scroll_to_fn: None,
            measure_element: None,
            enabled: true,
            overscan: 1,
            horizontal: false,
            is_rtl: false,
            initial_rect: None,
            padding_start: 0,
            padding_end: 0,
            scroll_padding_start: 0,
            scroll_padding_end: 0,
            scroll_margin: 0,
            gap: 0,
            lanes: 1,
            initial_offset: InitialOffset::default(),
            initial_measurements_cache: Arc::from(Vec::new()),
            on_change: None,
            use_scrollend_event: false,
            is_scrolling_reset_delay_ms: 150,
            should_adjust_scroll_position_on_item_size_change: None,
            index_attribute: Arc::from(DEFAULT_INDEX_ATTRIBUTE),
            max_scroll_to_index_retries: None,
            debug: false,
        }
    }

    /// Checks the options for values the engine cannot honor as given.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.lanes == 0 {
            return Err(OptionsError::ZeroLanes);
        }
        Ok(())
    }

    pub fn with_get_item_key(
        mut self,
        get_item_key: impl Fn(usize) -> K + Send + Sync + 'static,
    ) -> Self {
        self.get_item_key = Arc::new(get_item_key);
        self
    }

    pub fn with_range_extractor(
        mut self,
        range_extractor: Option<impl Fn(Range, &mut dyn FnMut(usize)) + Send + Sync + 'static>,
    ) -> Self {
        self.range_extractor = range_extractor.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_scroll_to_fn(
        mut self,
        scroll_to_fn: Option<impl Fn(u64, ScrollToOptions, &Virtualizer<K>) + Send + Sync + 'static>,
    ) -> Self {
        self.scroll_to_fn = scroll_to_fn.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_measure_element(
        mut self,
        measure_element: Option<
            impl Fn(&dyn ItemElement, Option<&ResizeEntry>, &Virtualizer<K>) -> u32
            + Send
            + Sync
            + 'static,
        >,
    ) -> Self {
        self.measure_element = measure_element.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    pub fn with_rtl(mut self, is_rtl: bool) -> Self {
        self.is_rtl = is_rtl;
        self
    }

    /// Sets the initial viewport rectangle.
    pub fn with_initial_rect(mut self, initial_rect: Option<Rect>) -> Self {
        self.initial_rect = initial_rect;
        self
    }

    pub fn with_padding(mut self, padding_start: u32, padding_end: u32) -> Self {
        self.padding_start = padding_start;
        self.padding_end = padding_end;
        self
    }

    pub fn with_scroll_padding(
        mut self,
        scroll_padding_start: u32,
        scroll_padding_end: u32,
    ) -> Self {
        self.scroll_padding_start = scroll_padding_start;
        self.scroll_padding_end = scroll_padding_end;
        self
    }

    pub fn with_scroll_margin(mut self, scroll_margin: u32) -> Self {
        self.scroll_margin = scroll_margin;
        self
    }

    pub fn with_gap(mut self, gap: u32) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_lanes(mut self, lanes: usize) -> Self {
        self.lanes = lanes;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: InitialOffset) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_initial_offset_value(mut self, initial_offset: u64) -> Self {
        self.initial_offset = InitialOffset::Value(initial_offset);
        self
    }

    pub fn with_initial_offset_provider(
        mut self,
        initial_offset: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> Self {
        self.initial_offset = InitialOffset::Provider(Arc::new(initial_offset));
        self
    }

    pub fn with_initial_measurements_cache(
        mut self,
        measurements: impl Into<Arc<[VirtualItem<K>]>>,
    ) -> Self {
        self.initial_measurements_cache = measurements.into();
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&Virtualizer<K>, bool) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_use_scrollend_event(mut self, use_scrollend_event: bool) -> Self {
        self.use_scrollend_event = use_scrollend_event;
        self
    }

    pub fn with_is_scrolling_reset_delay_ms(mut self, delay_ms: u64) -> Self {
        self.is_scrolling_reset_delay_ms = delay_ms;
        self
    }

    pub fn with_should_adjust_scroll_position_on_item_size_change(
        mut self,
        f: Option<impl Fn(&Virtualizer<K>, &VirtualItem<K>, i64) -> bool + Send + Sync + 'static>,
    ) -> Self {
        self.should_adjust_scroll_position_on_item_size_change = f.map(|f| Arc::new(f) as _);
        self
    }

    pub fn with_index_attribute(mut self, attribute: impl Into<Arc<str>>) -> Self {
        self.index_attribute = attribute.into();
        self
    }

    pub fn with_max_scroll_to_index_retries(mut self, max: Option<u32>) -> Self {
        self.max_scroll_to_index_retries = max;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

impl<K> core::fmt::Debug for VirtualizerOptions<K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VirtualizerOptions")
            .field("count", &self.count)
            .field("enabled", &self.enabled)
            .field("overscan", &self.overscan)
            .field("horizontal", &self.horizontal)
            .field("is_rtl", &self.is_rtl)
            .field("initial_rect", &self.initial_rect)
            .field("padding_start", &self.padding_start)
            .field("padding_end", &self.padding_end)
            .field("scroll_padding_start", &self.scroll_padding_start)
            .field("scroll_padding_end", &self.scroll_padding_end)
            .field("scroll_margin", &self.scroll_margin)
            .field("gap", &self.gap)
            .field("lanes", &self.lanes)
            .field("initial_offset", &self.initial_offset)
            .field("use_scrollend_event", &self.use_scrollend_event)
            .field(
                "is_scrolling_reset_delay_ms",
                &self.is_scrolling_reset_delay_ms,
            )
            .field("index_attribute", &self.index_attribute)
            .field(
                "max_scroll_to_index_retries",
                &self.max_scroll_to_index_retries,
            )
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
