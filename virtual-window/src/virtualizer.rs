use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use crate::collab::{ItemElement, ResizeEntry, measure_element_default};
use crate::error::expect_present;
use crate::extract::{IndexEmitter, default_range_extractor};
use crate::key::{KeyCacheKey, KeySet};
use crate::measurements::{MeasurementCache, MeasurementOptions};
use crate::memo::{ByAddress, Memo};
use crate::options::RangeExtractorFn;
use crate::range::{calculate_range, find_nearest_binary_search};
use crate::state::apply_delta;
use crate::{
    Align, IndexAttributeError, ItemKey, Range, Rect, ScrollBehavior, ScrollDirection,
    ScrollState, ScrollToIndexOptions, ScrollToOffsetOptions, ScrollToOptions, VirtualItem,
    VirtualizerOptions, VisibleRange,
};

type RangeDeps = (u64, u32, u64, usize);
type IndexDeps = (
    Option<ByAddress<RangeExtractorFn>>,
    Option<VisibleRange>,
    usize,
    usize,
);
type ItemsDeps = (ByAddress<[usize]>, u64);
type NotifyDeps = (bool, Option<usize>, Option<usize>);

/// A `scroll_to_index` waiting for the host's next tick to check whether it landed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingIndexScroll {
    index: usize,
    align: Align,
    behavior: Option<ScrollBehavior>,
    attempt: u32,
}

/// A headless virtualization engine.
///
/// This type is UI-agnostic:
/// - It does not hold any UI objects.
/// - The host feeds it container rects (`on_rect`), scroll offsets (`on_offset`) and item sizes
///   (`resize_item` / `measure_element`), and advances its clock with `tick`.
/// - Scroll requests go out through `options.scroll_to_fn`.
///
/// Derived values (measurements, range, indexes, items) are memoized on explicit dependency
/// tuples, which is why the getters take `&mut self`.
pub struct Virtualizer<K = ItemKey> {
    options: VirtualizerOptions<K>,
    scroll_rect: Rect,
    scroll: ScrollState,
    attached: bool,
    clock_ms: u64,
    last_scroll_event_ms: Option<u64>,

    cache: MeasurementCache<K>,
    range_memo: Memo<RangeDeps, Option<VisibleRange>>,
    indexes_memo: Memo<IndexDeps, Arc<[usize]>>,
    items_memo: Memo<ItemsDeps, Vec<VirtualItem<K>>>,
    notify_memo: Memo<NotifyDeps, ()>,

    /// Keys of items that currently have a live element.
    mounted: KeySet<K>,
    pending_index_scroll: Option<PendingIndexScroll>,

    notify_depth: Cell<usize>,
    notify_pending: Cell<Option<bool>>,
}

impl<K: KeyCacheKey> Virtualizer<K> {
    /// Creates a new, detached virtualizer.
    ///
    /// `options.initial_rect` and `options.initial_offset` are applied immediately, and
    /// `options.initial_measurements_cache` seeds the item-size cache.
    pub fn new(options: VirtualizerOptions<K>) -> Self {
        if options.validate().is_err() {
            vwarn!(lanes = options.lanes, "lanes must be at least 1; using 1");
        }
        vdebug!(
            count = options.count,
            enabled = options.enabled,
            overscan = options.overscan,
            lanes = options.lanes,
            "Virtualizer::new"
        );

        let mut cache = MeasurementCache::new();
        for item in options.initial_measurements_cache.iter() {
            cache.seed_size(item.key.clone(), item.size);
        }

        Self {
            scroll_rect: options.initial_rect.unwrap_or_default(),
            scroll: ScrollState {
                offset: options.initial_offset.resolve(),
                ..ScrollState::default()
            },
            attached: false,
            clock_ms: 0,
            last_scroll_event_ms: None,
            cache,
            range_memo: Memo::new("range"),
            indexes_memo: Memo::new("indexes"),
            items_memo: Memo::new("items"),
            notify_memo: Memo::new("notify"),
            mounted: KeySet::<K>::new(),
            pending_index_scroll: None,
            options,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(None),
        }
    }

    pub fn options(&self) -> &VirtualizerOptions<K> {
        &self.options
    }

    /// Replaces the options. Derived values are recomputed lazily, only where their
    /// dependencies changed.
    pub fn set_options(&mut self, options: VirtualizerOptions<K>) {
        if options.validate().is_err() {
            vwarn!(lanes = options.lanes, "lanes must be at least 1; using 1");
        }
        self.options = options;
        vtrace!(
            count = self.options.count,
            enabled = self.options.enabled,
            overscan = self.options.overscan,
            "Virtualizer::set_options"
        );
        self.maybe_notify();
    }

    /// Clones the current options, applies `f`, then delegates to `set_options`.
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualizerOptions<K>)) {
        let mut next = self.options.clone();
        f(&mut next);
        self.set_options(next);
    }

    /// Connects the virtualizer to a scroll container.
    ///
    /// Issues a scroll to the current offset so the container starts where the virtualizer
    /// believes it is (this is how `initial_offset` reaches the host).
    pub fn attach(&mut self) {
        if self.attached {
            return;
        }
        vdebug!(offset = self.scroll.offset, "Virtualizer::attach");
        self.attached = true;
        self.scroll_to(self.scroll.offset, ScrollToOptions::default());
    }

    /// Disconnects from the scroll container.
    ///
    /// Cancels a pending deferred scroll and forgets live elements. The item-size cache is kept,
    /// so a remount of the same collection starts from measured sizes.
    pub fn detach(&mut self) {
        if !self.attached {
            return;
        }
        vdebug!(cached = self.cache.cached_len(), "Virtualizer::detach");
        self.cancel_scroll_to_index();
        self.mounted.clear();
        self.attached = false;
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    fn notify_now(&self, sync: bool) {
        if let Some(cb) = &self.options.on_change {
            cb(self, sync);
        }
    }

    fn notify(&self, sync: bool) {
        if self.notify_depth.get() > 0 {
            let pending = self.notify_pending.get().unwrap_or(false);
            self.notify_pending.set(Some(pending || sync));
            return;
        }
        self.notify_now(sync);
    }

    /// Notifies only when `is_scrolling` or the visible range changed since the last notification.
    fn maybe_notify(&mut self) {
        let range = self.calculate_range();
        let deps = (
            self.scroll.is_scrolling,
            range.map(|r| r.start_index),
            range.map(|r| r.end_index),
        );
        let mut changed = false;
        self.notify_memo.get(deps, |_| changed = true);
        if changed {
            self.notify(self.scroll.is_scrolling);
        }
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// On a typical frame an adapter may report the rect, the offset and a few measurements
    /// together; without batching each of them may trigger `on_change`.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 {
            if let Some(sync) = self.notify_pending.replace(None) {
                self.notify_now(sync);
            }
        }
    }

    pub fn count(&self) -> usize {
        self.options.count
    }

    pub fn enabled(&self) -> bool {
        self.options.enabled
    }

    pub fn lanes(&self) -> usize {
        self.options.lanes.max(1)
    }

    pub fn key_for(&self, index: usize) -> K {
        (self.options.get_item_key)(index)
    }

    pub fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll.direction
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll.offset
    }

    /// Correction issued since the host last reported an offset.
    pub fn pending_adjustment(&self) -> i64 {
        self.scroll.pending_adjustment
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.scroll
    }

    pub fn scroll_rect(&self) -> Rect {
        self.scroll_rect
    }

    /// Container size along the virtualized axis.
    pub fn viewport_size(&self) -> u32 {
        self.scroll_rect.main(self.options.horizontal)
    }

    /// Rect observation entry point.
    pub fn on_rect(&mut self, rect: Rect) {
        if self.scroll_rect == rect {
            return;
        }
        vtrace!(width = rect.width, height = rect.height, "on_rect");
        self.scroll_rect = rect;
        self.maybe_notify();
    }

    /// Offset observation entry point.
    ///
    /// A reported offset already contains every adjustment issued so far, so
    /// `pending_adjustment` starts over from zero.
    pub fn on_offset(&mut self, offset: u64, is_scrolling: bool) {
        vtrace!(offset, is_scrolling, "on_offset");
        self.scroll.pending_adjustment = 0;
        self.scroll.direction = if is_scrolling {
            if self.scroll.offset < offset {
                Some(ScrollDirection::Forward)
            } else {
                Some(ScrollDirection::Backward)
            }
        } else {
            None
        };
        self.scroll.offset = offset;
        self.scroll.is_scrolling = is_scrolling;
        self.last_scroll_event_ms = is_scrolling.then_some(self.clock_ms);
        self.maybe_notify();
    }

    /// Reports a user scroll tick at `now_ms` (wheel, drag, keyboard).
    pub fn apply_scroll_event(&mut self, offset: u64, now_ms: u64) {
        self.clock_ms = self.clock_ms.max(now_ms);
        self.on_offset(offset, true);
    }

    /// Advances the engine clock.
    ///
    /// Without `use_scrollend_event`, clears `is_scrolling` once no scroll tick arrived for
    /// `is_scrolling_reset_delay_ms`. Then runs the deferred `scroll_to_index` retry, if any.
    pub fn tick(&mut self, now_ms: u64) {
        self.clock_ms = self.clock_ms.max(now_ms);
        if self.scroll.is_scrolling && !self.options.use_scrollend_event {
            if let Some(last) = self.last_scroll_event_ms {
                if self.clock_ms.saturating_sub(last) >= self.options.is_scrolling_reset_delay_ms {
                    self.on_offset(self.scroll.offset, false);
                }
            }
        }
        self.run_deferred();
    }

    /// Whether at least one item has a live, measured element.
    pub fn is_dynamic_mode(&self) -> bool {
        !self.mounted.is_empty()
    }

    pub fn has_pending_scroll(&self) -> bool {
        self.pending_index_scroll.is_some()
    }

    fn measurement_options(&self) -> MeasurementOptions<K> {
        MeasurementOptions {
            count: self.options.count,
            padding_start: self.options.padding_start,
            scroll_margin: self.options.scroll_margin,
            gap: self.options.gap,
            lanes: self.lanes(),
            enabled: self.options.enabled,
            estimate_size: ByAddress::new(&self.options.estimate_size),
            get_item_key: ByAddress::new(&self.options.get_item_key),
        }
    }

    /// Positioned items for the whole collection.
    pub fn get_measurements(&mut self) -> &[VirtualItem<K>] {
        let options = self.measurement_options();
        self.cache.compute(&options)
    }

    /// Copies the current measurements, e.g. to seed `initial_measurements_cache` of a
    /// virtualizer created for a remount.
    pub fn measurements_snapshot(&mut self) -> Vec<VirtualItem<K>> {
        self.get_measurements().to_vec()
    }

    /// The tight visible window, or `None` when there is nothing to show.
    pub fn calculate_range(&mut self) -> Option<VisibleRange> {
        let options = self.measurement_options();
        self.cache.compute(&options);
        let deps = (
            self.cache.version(),
            self.viewport_size(),
            self.scroll.offset,
            self.lanes(),
        );
        let cache = &self.cache;
        *self
            .range_memo
            .get_traced(self.options.debug, || deps, |&(_, outer, offset, lanes)| {
                let measurements = cache.items();
                (!measurements.is_empty() && outer > 0)
                    .then(|| calculate_range(measurements, outer, offset, lanes))
            })
    }

    fn virtual_indexes(&mut self) -> Arc<[usize]> {
        let range = self.calculate_range();
        let extractor = self.options.range_extractor.clone();
        let deps = (
            extractor.as_ref().map(ByAddress::new),
            range,
            self.options.overscan,
            self.options.count,
        );
        let indexes = self
            .indexes_memo
            .get_traced(self.options.debug, || deps, |&(_, range, overscan, count)| {
                let Some(range) = range else {
                    return Arc::from(Vec::new());
                };
                let range = Range {
                    start_index: range.start_index,
                    end_index: range.end_index,
                    overscan,
                    count,
                };
                let mut out = Vec::new();
                let mut push = |i: usize| out.push(i);
                let mut emitter = IndexEmitter::new(range, &mut push);
                let mut emit = |i: usize| {
                    emitter.emit(i);
                };
                match &extractor {
                    Some(extract) => extract(range, &mut emit),
                    None => default_range_extractor(range, &mut emit),
                }
                Arc::from(out)
            });
        Arc::clone(indexes)
    }

    /// Indexes to render: the visible range after the range extractor.
    pub fn get_virtual_indexes(&mut self) -> &[usize] {
        self.virtual_indexes();
        self.indexes_memo.peek().map_or(&[][..], |indexes| &indexes[..])
    }

    fn item_list(&mut self, indexes: Arc<[usize]>, version: u64) -> &[VirtualItem<K>] {
        let cache = &self.cache;
        self.items_memo.get_traced(
            self.options.debug,
            || (ByAddress(indexes), version),
            |(indexes, _)| {
                let measurements = cache.items();
                indexes
                    .0
                    .iter()
                    .filter_map(|&i| measurements.get(i).cloned())
                    .collect()
            },
        )
    }

    /// Items to render, in index order.
    pub fn get_virtual_items(&mut self) -> &[VirtualItem<K>] {
        let indexes = self.virtual_indexes();
        let version = self.cache.version();
        self.item_list(indexes, version)
    }

    /// Total scrollable size of the list (excluding `scroll_margin`).
    pub fn get_total_size(&mut self) -> u64 {
        let lanes = self.lanes();
        let padding_start = self.options.padding_start as i128;
        let padding_end = self.options.padding_end as i128;
        let margin = self.options.scroll_margin as i128;
        let measurements = self.get_measurements();

        let end = match measurements.last() {
            None => padding_start,
            Some(last) if lanes == 1 => last.end as i128,
            Some(_) => {
                let mut end_by_lane: Vec<Option<u64>> = alloc::vec![None; lanes];
                let mut found = 0usize;
                for item in measurements.iter().rev() {
                    if found == lanes {
                        break;
                    }
                    let slot = &mut end_by_lane[item.lane % lanes];
                    if slot.is_none() {
                        *slot = Some(item.end);
                        found += 1;
                    }
                }
                end_by_lane.iter().flatten().copied().max().unwrap_or(0) as i128
            }
        };

        (end - margin + padding_end).max(0) as u64
    }

    /// The measured item whose start is the floor of `offset`.
    pub fn get_virtual_item_for_offset(&mut self, offset: u64) -> Option<&VirtualItem<K>> {
        let measurements = self.get_measurements();
        if measurements.is_empty() {
            return None;
        }
        let index = find_nearest_binary_search(
            0,
            measurements.len() - 1,
            |i| measurements[i].start as i128,
            offset as i128,
        );
        Some(expect_present(
            measurements.get(index),
            "measurement at searched index",
        ))
    }

    /// Resolves `to_offset` through `align` and clamps it to the scrollable range.
    ///
    /// `auto` becomes `end` when `to_offset` lies past the viewport, `start` otherwise. Offsets
    /// are whole pixels: a `center` that falls on a half pixel rounds down.
    pub fn get_offset_for_alignment(&mut self, to_offset: i64, align: Align, item_size: u32) -> u64 {
        let size = self.viewport_size() as i64;
        let scroll_offset = self.scroll.offset as i64;
        let align = match align {
            Align::Auto if to_offset >= scroll_offset.saturating_add(size) => Align::End,
            Align::Auto => Align::Start,
            other => other,
        };
        let to_offset = match align {
            Align::Center => to_offset.saturating_add((item_size as i64 - size).div_euclid(2)),
            Align::End => to_offset.saturating_sub(size),
            _ => to_offset,
        };
        let max_offset =
            self.get_total_size() as i64 + self.options.scroll_margin as i64 - size;
        to_offset.min(max_offset).max(0) as u64
    }

    /// Target offset that brings `index` into view under `align`, with the alignment that was
    /// finally used.
    ///
    /// With `Align::Auto`, an item already inside the viewport (minus scroll padding) yields the
    /// current offset, i.e. no scroll.
    pub fn get_offset_for_index(&mut self, index: usize, align: Align) -> Option<(u64, Align)> {
        let count = self.options.count;
        if count == 0 {
            return None;
        }
        let index = index.min(count - 1);
        let (start, end, item_size) = {
            let item = self.get_measurements().get(index)?;
            (item.start as i64, item.end as i64, item.size)
        };

        let size = self.viewport_size() as i64;
        let scroll_offset = self.scroll.offset as i64;
        let padding_start = self.options.scroll_padding_start as i64;
        let padding_end = self.options.scroll_padding_end as i64;

        let align = match align {
            Align::Auto if end >= scroll_offset + size - padding_end => Align::End,
            Align::Auto if start <= scroll_offset + padding_start => Align::Start,
            Align::Auto => return Some((self.scroll.offset, Align::Auto)),
            other => other,
        };
        let to_offset = if align == Align::End {
            end + padding_end
        } else {
            start - padding_start
        };
        Some((
            self.get_offset_for_alignment(to_offset, align, item_size),
            align,
        ))
    }

    fn cancel_scroll_to_index(&mut self) {
        if self.pending_index_scroll.take().is_some() {
            vtrace!("cancel deferred scroll_to_index");
        }
    }

    fn warn_smooth_in_dynamic_mode(&self, behavior: Option<ScrollBehavior>) {
        if behavior == Some(ScrollBehavior::Smooth) && self.is_dynamic_mode() {
            vwarn!("smooth scroll behavior is not fully supported with dynamically measured sizes");
        }
    }

    /// Hands a scroll request to the executor.
    fn scroll_to(&mut self, offset: u64, options: ScrollToOptions) {
        if !self.attached {
            vtrace!(offset, "scroll request ignored: not attached");
            return;
        }
        vtrace!(
            offset,
            adjustments = options.adjustments,
            "scroll request"
        );
        match self.options.scroll_to_fn.clone() {
            Some(scroll_to_fn) => scroll_to_fn(offset, options, self),
            None => {
                let target = apply_delta(offset, options.adjustments.unwrap_or(0));
                self.on_offset(target, self.scroll.is_scrolling);
            }
        }
    }

    /// Scrolls to an absolute offset, resolved through `options.align` (default `start`).
    pub fn scroll_to_offset(&mut self, to_offset: u64, options: ScrollToOffsetOptions) {
        self.cancel_scroll_to_index();
        self.warn_smooth_in_dynamic_mode(options.behavior);
        let to_offset = i64::try_from(to_offset).unwrap_or(i64::MAX);
        let offset = self.get_offset_for_alignment(to_offset, options.align, 0);
        self.scroll_to(
            offset,
            ScrollToOptions {
                adjustments: None,
                behavior: options.behavior,
            },
        );
    }

    /// Scrolls by `delta` relative to the current offset.
    pub fn scroll_by(&mut self, delta: i64, behavior: Option<ScrollBehavior>) {
        self.cancel_scroll_to_index();
        self.warn_smooth_in_dynamic_mode(behavior);
        let to_offset = (self.scroll.offset as i64).saturating_add(delta);
        let offset = self.get_offset_for_alignment(to_offset, Align::Start, 0);
        self.scroll_to(
            offset,
            ScrollToOptions {
                adjustments: None,
                behavior,
            },
        );
    }

    /// Scrolls so that `index` (clamped to the collection) is in view.
    ///
    /// In dynamic mode a non-smooth scroll arms one deferred retry, run by the next
    /// [`Virtualizer::tick`]: estimates may have been wrong, so once the target element is
    /// measured the offset is recomputed and the scroll re-issued if it moved by more than 1px.
    pub fn scroll_to_index(&mut self, index: usize, options: ScrollToIndexOptions) {
        self.cancel_scroll_to_index();
        self.scroll_to_index_attempt(index, options, 0);
    }

    fn scroll_to_index_attempt(&mut self, index: usize, options: ScrollToIndexOptions, attempt: u32) {
        if !self.attached || self.options.count == 0 {
            return;
        }
        let index = index.min(self.options.count - 1);
        self.warn_smooth_in_dynamic_mode(options.behavior);

        let Some((offset, align)) = self.get_offset_for_index(index, options.align) else {
            return;
        };
        vtrace!(index, offset, attempt, "scroll_to_index");
        self.scroll_to(
            offset,
            ScrollToOptions {
                adjustments: None,
                behavior: options.behavior,
            },
        );

        if options.behavior != Some(ScrollBehavior::Smooth) && self.is_dynamic_mode() {
            self.pending_index_scroll = Some(PendingIndexScroll {
                index,
                align,
                behavior: options.behavior,
                attempt,
            });
        }
    }

    /// Runs the deferred `scroll_to_index` retry, if one is armed.
    pub fn run_deferred(&mut self) {
        let Some(pending) = self.pending_index_scroll.take() else {
            return;
        };
        if !self.attached || !self.options.enabled || self.options.count == 0 {
            return;
        }
        if let Some(max) = self.options.max_scroll_to_index_retries {
            if pending.attempt >= max {
                vwarn!(
                    index = pending.index,
                    attempts = pending.attempt,
                    "scroll_to_index did not converge; giving up"
                );
                return;
            }
        }

        let options = ScrollToIndexOptions {
            align: pending.align,
            behavior: pending.behavior,
        };
        let key = self.key_for(pending.index);
        if self.mounted.contains(&key) {
            let (latest, _) = expect_present(
                self.get_offset_for_index(pending.index, pending.align),
                "offset for a mounted index",
            );
            if latest.abs_diff(self.scroll.offset) > 1 {
                self.scroll_to_index_attempt(pending.index, options, pending.attempt + 1);
            }
        } else {
            self.scroll_to_index_attempt(pending.index, options, pending.attempt + 1);
        }
    }

    /// Records a new size for the item at `index`.
    ///
    /// No-op when the size matches the cached one. Otherwise the scroll position is compensated
    /// (see `should_adjust_scroll_position_on_item_size_change`) and `on_change` fires.
    pub fn resize_item(&mut self, index: usize, size: u32) {
        let Some(item) = self.get_measurements().get(index).cloned() else {
            return;
        };
        let item_size = self.cache.cached_size(&item.key).unwrap_or(item.size);
        let delta = size as i64 - item_size as i64;
        if delta == 0 {
            return;
        }

        let should_adjust = match self
            .options
            .should_adjust_scroll_position_on_item_size_change
            .clone()
        {
            Some(f) => f(self, &item, delta),
            None => item.start < self.scroll.effective_offset(),
        };
        if should_adjust {
            vtrace!(index, delta, "resize_item: compensating scroll position");
            self.scroll.pending_adjustment += delta;
            self.scroll_to(
                self.scroll.offset,
                ScrollToOptions {
                    adjustments: Some(self.scroll.pending_adjustment),
                    behavior: None,
                },
            );
        }

        self.cache.set_size(item.index, item.key, size);
        self.notify(false);
    }

    /// Drops every measured size; positions fall back to estimates.
    pub fn measure(&mut self) {
        vdebug!(cached = self.cache.cached_len(), "measure: clearing size cache");
        self.cache.clear_sizes();
        self.notify(false);
    }

    pub fn cached_item_size(&self, key: &K) -> Option<u32> {
        self.cache.cached_size(key)
    }

    /// Number of cached measured sizes (key → size).
    pub fn measurement_cache_len(&self) -> usize {
        self.cache.cached_len()
    }

    /// Iterates over the cached measured sizes (key → size) without allocations.
    pub fn for_each_cached_size(&self, f: impl FnMut(&K, u32)) {
        self.cache.for_each_cached_size(f);
    }

    /// Reads the item index from the element's index attribute.
    pub fn try_index_from_element(
        &self,
        element: &dyn ItemElement,
    ) -> Result<usize, IndexAttributeError> {
        let attribute = &*self.options.index_attribute;
        let value = element
            .attribute(attribute)
            .ok_or_else(|| IndexAttributeError::Missing {
                attribute: attribute.to_string(),
            })?;
        value
            .trim()
            .parse::<usize>()
            .map_err(|_| IndexAttributeError::Invalid {
                attribute: attribute.to_string(),
                value: value.to_string(),
            })
    }

    /// Like [`Virtualizer::try_index_from_element`], logging a warning and returning `None` when
    /// the element carries no usable index.
    pub fn index_from_element(&self, element: &dyn ItemElement) -> Option<usize> {
        match self.try_index_from_element(element) {
            Ok(index) => Some(index),
            Err(_err) => {
                vwarn!(error = %_err, "cannot map measured element to an item");
                None
            }
        }
    }

    /// Measures a rendered item element and records its size.
    pub fn measure_element(&mut self, element: &dyn ItemElement) {
        self.measure_element_with_entry(element, None);
    }

    /// Same as [`Virtualizer::measure_element`], for a resize notification carrying a size.
    ///
    /// The element's item becomes live (see [`Virtualizer::is_dynamic_mode`]). A disconnected
    /// element is forgotten instead of measured.
    pub fn measure_element_with_entry(
        &mut self,
        element: &dyn ItemElement,
        entry: Option<&ResizeEntry>,
    ) {
        let Some(index) = self.index_from_element(element) else {
            return;
        };
        let Some(key) = self.get_measurements().get(index).map(|item| item.key.clone()) else {
            return;
        };

        if !element.is_connected() {
            self.mounted.remove(&key);
            return;
        }
        self.mounted.insert(key);

        let size = match self.options.measure_element.clone() {
            Some(measure) => measure(element, entry, self),
            None => measure_element_default(element, entry, self.options.horizontal),
        };
        self.resize_item(index, size);
    }

    /// Forgets the live element of the item at `index` (e.g. when the host unmounts it).
    pub fn release_element(&mut self, index: usize) {
        if index >= self.options.count {
            return;
        }
        let key = self.key_for(index);
        self.mounted.remove(&key);
    }
}

impl<K> fmt::Debug for Virtualizer<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Virtualizer")
            .field("options", &self.options)
            .field("scroll_rect", &self.scroll_rect)
            .field("scroll", &self.scroll)
            .field("attached", &self.attached)
            .field("pending_index_scroll", &self.pending_index_scroll)
            .finish_non_exhaustive()
    }
}
