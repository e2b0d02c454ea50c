use crate::*;

use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use proptest::prelude::*;

type Requests = Arc<Mutex<Vec<(u64, Option<i64>)>>>;

fn list(count: usize, size: u32, viewport: u32) -> VirtualizerOptions {
    VirtualizerOptions::new(count, move |_| size).with_initial_rect(Some(Rect::new(0, viewport)))
}

fn attached(options: VirtualizerOptions) -> Virtualizer {
    let mut v = Virtualizer::new(options);
    v.attach();
    v
}

/// Options whose scroll executor only records requests, like a host that applies them later.
fn recording(options: VirtualizerOptions) -> (VirtualizerOptions, Requests) {
    let requests: Requests = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&requests);
    let options = options.with_scroll_to_fn(Some(
        move |offset: u64, opts: ScrollToOptions, _: &Virtualizer| {
            sink.lock().unwrap().push((offset, opts.adjustments));
        },
    ));
    (options, requests)
}

struct FakeElement {
    attributes: Vec<(String, String)>,
    size: u32,
    connected: bool,
}

impl FakeElement {
    fn item(index: usize, size: u32) -> Self {
        Self {
            attributes: alloc::vec![("data-index".to_string(), index.to_string())],
            size,
            connected: true,
        }
    }

    fn bare(size: u32) -> Self {
        Self {
            attributes: Vec::new(),
            size,
            connected: true,
        }
    }

    fn with_attribute(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    fn disconnected(mut self) -> Self {
        self.connected = false;
        self
    }
}

impl ItemElement for FakeElement {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn size(&self, _horizontal: bool) -> u32 {
        self.size
    }
}

#[test]
fn fixed_size_range_and_indexes() {
    let mut v = Virtualizer::new(list(1000, 50, 500));
    assert_eq!(
        v.calculate_range(),
        Some(VisibleRange {
            start_index: 0,
            end_index: 9
        })
    );
    let expected: Vec<usize> = (0..=10).collect();
    assert_eq!(v.get_virtual_indexes(), &expected[..]);
    assert_eq!(v.get_total_size(), 50_000);
}

#[test]
fn overscan_widens_both_sides() {
    let mut v = attached(list(100, 50, 500).with_overscan(3));
    v.on_offset(2500, false);
    assert_eq!(
        v.calculate_range(),
        Some(VisibleRange {
            start_index: 50,
            end_index: 59
        })
    );
    let expected: Vec<usize> = (47..=62).collect();
    assert_eq!(v.get_virtual_indexes(), &expected[..]);

    let items = v.get_virtual_items();
    assert_eq!(items.len(), expected.len());
    assert_eq!(items[0].index, 47);
    assert_eq!(items[0].start, 47 * 50);
}

#[test]
fn range_is_none_without_viewport_or_items() {
    let mut v = Virtualizer::new(VirtualizerOptions::new(100, |_| 50));
    assert_eq!(v.calculate_range(), None);
    assert!(v.get_virtual_indexes().is_empty());
    assert!(v.get_virtual_items().is_empty());

    let mut v = Virtualizer::new(list(0, 50, 500));
    assert_eq!(v.calculate_range(), None);
    assert!(v.get_virtual_items().is_empty());
}

#[test]
fn two_lanes_form_a_brick_layout() {
    let mut v = Virtualizer::new(list(5, 50, 500).with_lanes(2).with_padding(10, 0));
    let m = v.get_measurements();
    assert_eq!((m[0].start, m[0].lane), (10, 0));
    assert_eq!((m[1].start, m[1].lane), (10, 1));
    assert_eq!((m[2].start, m[2].lane), (m[0].end, 0));
    assert_eq!((m[3].start, m[3].lane), (m[1].end, 1));
    assert_eq!((m[4].start, m[4].lane), (m[2].end, 0));
    assert_eq!(v.get_total_size(), 160);
}

#[test]
fn lanes_fill_the_shortest_column_first() {
    let sizes = [100u32, 30, 30, 30];
    let mut v = Virtualizer::new(
        VirtualizerOptions::new(sizes.len(), move |i| sizes[i])
            .with_lanes(2)
            .with_initial_rect(Some(Rect::new(0, 500))),
    );
    let m = v.get_measurements();
    // Lane 1 (30) is shorter than lane 0 (100), so items 2 and 3 stack under item 1.
    assert_eq!((m[2].start, m[2].lane), (30, 1));
    assert_eq!((m[3].start, m[3].lane), (60, 1));
    assert_eq!(v.get_total_size(), 100);
}

#[test]
fn multi_lane_range_snaps_to_whole_rows() {
    let mut v = attached(list(100, 50, 100).with_lanes(3));
    v.on_offset(275, false);
    let range = v.calculate_range().unwrap();
    assert_eq!(range.start_index % 3, 0);
    assert_eq!(range.end_index % 3, 2);
    assert!(range.start_index <= 15 && range.end_index >= 23);
}

#[test]
fn zero_lanes_is_rejected_and_treated_as_one() {
    let options = list(3, 50, 500).with_lanes(0);
    assert_eq!(options.validate(), Err(OptionsError::ZeroLanes));

    let mut v = Virtualizer::new(options);
    let starts: Vec<u64> = v.get_measurements().iter().map(|m| m.start).collect();
    assert_eq!(starts, [0, 50, 100]);
}

#[test]
fn padding_gap_and_margin_affect_positions_and_total() {
    let mut v = Virtualizer::new(list(3, 2, 500).with_padding(10, 5).with_gap(1));
    let starts: Vec<u64> = v.get_measurements().iter().map(|m| m.start).collect();
    assert_eq!(starts, [10, 13, 16]);
    assert_eq!(v.get_total_size(), 23);

    let mut v = Virtualizer::new(
        list(3, 2, 500)
            .with_padding(10, 5)
            .with_gap(1)
            .with_scroll_margin(7),
    );
    assert_eq!(v.get_measurements()[0].start, 17);
    assert_eq!(v.get_total_size(), 23);
}

#[test]
fn binary_search_has_floor_semantics() {
    let starts = [0i128, 10, 20, 30];
    let find = |target| find_nearest_binary_search(0, 3, |i| starts[i], target);
    assert_eq!(find(15), 1);
    assert_eq!(find(5), 0);
    assert_eq!(find(-1), 0);
    assert_eq!(find(20), 2);
    assert_eq!(find(99), 3);
}

#[test]
fn virtual_item_for_offset() {
    let mut v = Virtualizer::new(list(10, 50, 500));
    assert_eq!(v.get_virtual_item_for_offset(125).map(|i| i.index), Some(2));
    assert_eq!(v.get_virtual_item_for_offset(0).map(|i| i.index), Some(0));
    assert_eq!(v.get_virtual_item_for_offset(10_000).map(|i| i.index), Some(9));

    let mut empty = Virtualizer::new(list(0, 50, 500));
    assert!(empty.get_virtual_item_for_offset(0).is_none());
}

#[test]
fn custom_range_extractor_pins_first_row() {
    let mut v = attached(list(100, 50, 500).with_range_extractor(Some(
        |r: Range, emit: &mut dyn FnMut(usize)| {
            emit(0);
            for i in r.start_index..=r.end_index {
                emit(i);
            }
        },
    )));
    v.on_offset(2500, false);
    let mut expected = alloc::vec![0usize];
    expected.extend(50..=59);
    assert_eq!(v.get_virtual_indexes(), &expected[..]);

    v.on_offset(0, false);
    let expected: Vec<usize> = (0..=9).collect();
    assert_eq!(v.get_virtual_indexes(), &expected[..]);
}

#[test]
fn unsorted_extractor_output_is_dropped() {
    let mut v = attached(list(100, 50, 500).with_range_extractor(Some(
        |_: Range, emit: &mut dyn FnMut(usize)| {
            for i in [5, 3, 5, 7, 250, 8] {
                emit(i);
            }
        },
    )));
    assert_eq!(v.get_virtual_indexes(), &[5, 7, 8][..]);
}

#[test]
fn index_emitter_ignores_duplicates_and_clamps() {
    let range = Range {
        start_index: 8,
        end_index: 9,
        overscan: 2,
        count: 10,
    };
    let mut out = Vec::new();
    let mut push = |i: usize| out.push(i);
    let mut e = IndexEmitter::new(range, &mut push);
    e.emit(0);
    e.emit(0);
    e.emit_overscanned();
    assert_eq!(out, [0, 6, 7, 8, 9]);
}

#[test]
fn offset_for_alignment() {
    let mut v = Virtualizer::new(list(100, 50, 500));
    assert_eq!(v.get_offset_for_alignment(1000, Align::Start, 0), 1000);
    assert_eq!(v.get_offset_for_alignment(1000, Align::Center, 50), 775);
    assert_eq!(v.get_offset_for_alignment(1000, Align::End, 0), 500);
    assert_eq!(v.get_offset_for_alignment(1000, Align::Auto, 0), 500);
    assert_eq!(v.get_offset_for_alignment(100, Align::Auto, 0), 100);
    assert_eq!(v.get_offset_for_alignment(10_000, Align::Start, 0), 4500);
    assert_eq!(v.get_offset_for_alignment(-5, Align::Start, 0), 0);
    // 1000 + (51 - 500) / 2 = 775.5
    assert_eq!(v.get_offset_for_alignment(1000, Align::Center, 51), 775);
    assert_eq!(v.get_offset_for_alignment(i64::MAX, Align::Center, 900), 4500);
    assert_eq!(v.get_offset_for_alignment(i64::MIN, Align::End, 0), 0);
}

#[test]
fn offset_for_index() {
    let mut v = Virtualizer::new(list(100, 50, 500));
    assert_eq!(v.get_offset_for_index(5, Align::Auto), Some((0, Align::Auto)));
    assert_eq!(v.get_offset_for_index(20, Align::Auto), Some((550, Align::End)));
    assert_eq!(v.get_offset_for_index(20, Align::Start), Some((1000, Align::Start)));
    assert_eq!(v.get_offset_for_index(20, Align::Center), Some((775, Align::Center)));
    // Out-of-range indexes clamp to the last item.
    assert_eq!(v.get_offset_for_index(500, Align::Start), Some((4500, Align::Start)));

    let mut v = Virtualizer::new(list(100, 50, 500).with_scroll_padding(20, 30));
    assert_eq!(v.get_offset_for_index(20, Align::Start), Some((980, Align::Start)));
    assert_eq!(v.get_offset_for_index(20, Align::End), Some((580, Align::End)));

    let mut v = Virtualizer::new(list(0, 50, 500));
    assert_eq!(v.get_offset_for_index(0, Align::Auto), None);
}

#[test]
fn scroll_to_offset_and_scroll_by_clamp() {
    let mut v = attached(list(100, 50, 500));
    v.scroll_to_offset(300, ScrollToOffsetOptions::default());
    assert_eq!(v.scroll_offset(), 300);

    v.scroll_by(120, None);
    assert_eq!(v.scroll_offset(), 420);
    v.scroll_by(-1000, None);
    assert_eq!(v.scroll_offset(), 0);
    v.scroll_by(10_000, None);
    assert_eq!(v.scroll_offset(), 4500);

    v.scroll_to_offset(1000, ScrollToOffsetOptions::align(Align::End));
    assert_eq!(v.scroll_offset(), 500);
}

#[test]
fn scroll_extremes_clamp_without_overflow() {
    let mut v = attached(list(100, 50, 500));
    v.scroll_to_offset(300, ScrollToOffsetOptions::default());
    v.scroll_by(i64::MAX, None);
    assert_eq!(v.scroll_offset(), 4500);
    v.scroll_by(i64::MIN, None);
    assert_eq!(v.scroll_offset(), 0);

    v.scroll_to_offset(u64::MAX, ScrollToOffsetOptions::default());
    assert_eq!(v.scroll_offset(), 4500);
    v.scroll_to_offset(u64::MAX, ScrollToOffsetOptions::align(Align::Center));
    assert_eq!(v.scroll_offset(), 4500);
}

#[test]
fn scroll_requests_are_ignored_while_detached() {
    let (options, requests) = recording(list(100, 50, 500));
    let mut v = Virtualizer::new(options);
    v.scroll_to_offset(300, ScrollToOffsetOptions::default());
    v.scroll_to_index(40, ScrollToIndexOptions::default());
    v.scroll_by(10, None);
    assert!(requests.lock().unwrap().is_empty());
    assert_eq!(v.scroll_offset(), 0);
}

#[test]
fn attach_applies_initial_offset() {
    let (options, requests) = recording(list(100, 50, 500).with_initial_offset_value(300));
    let mut v = Virtualizer::new(options);
    assert_eq!(v.scroll_offset(), 300);
    v.attach();
    assert_eq!(*requests.lock().unwrap(), [(300, None)]);

    let v = Virtualizer::new(list(100, 50, 500).with_initial_offset_provider(|| 777));
    assert_eq!(v.scroll_offset(), 777);
}

#[test]
fn scroll_to_index_reaches_the_item() {
    let mut v = attached(list(100, 50, 500));
    v.scroll_to_index(40, ScrollToIndexOptions::default());
    assert_eq!(v.scroll_offset(), 2050 - 500);
    // Already visible: no movement.
    v.scroll_to_index(38, ScrollToIndexOptions::default());
    assert_eq!(v.scroll_offset(), 1550);
    v.scroll_to_index(10, ScrollToIndexOptions::align(Align::Start));
    assert_eq!(v.scroll_offset(), 500);
    // Not in dynamic mode, so nothing is deferred.
    assert!(!v.has_pending_scroll());
}

#[test]
fn resize_before_viewport_compensates_scroll() {
    let (options, requests) = recording(list(100, 50, 500));
    let mut v = attached(options);
    v.on_offset(200, false);
    requests.lock().unwrap().clear();
    let before = v.get_measurements()[4].start as i64 - v.scroll_state().effective_offset() as i64;

    v.resize_item(1, 80);

    assert_eq!(v.pending_adjustment(), 30);
    assert_eq!(*requests.lock().unwrap(), [(200, Some(30))]);
    let after = v.get_measurements()[4].start as i64 - v.scroll_state().effective_offset() as i64;
    assert_eq!(before, after);

    // The host reports the compensated offset; the adjustment has landed.
    v.on_offset(230, false);
    assert_eq!(v.pending_adjustment(), 0);
}

#[test]
fn resize_after_viewport_does_not_compensate() {
    let (options, requests) = recording(list(100, 50, 500));
    let mut v = attached(options);
    v.on_offset(200, false);
    requests.lock().unwrap().clear();

    v.resize_item(10, 80);
    assert_eq!(v.pending_adjustment(), 0);
    assert!(requests.lock().unwrap().is_empty());
    assert_eq!(v.get_measurements()[11].start, 580);
}

#[test]
fn resize_with_same_size_is_a_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut v = Virtualizer::new(list(10, 50, 500).with_on_change(Some(
        move |_: &Virtualizer, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        },
    )));
    v.resize_item(3, 50);
    assert_eq!(calls.load(Ordering::Relaxed), 0);
    assert_eq!(v.measurement_cache_len(), 0);
    v.resize_item(3, 60);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    assert_eq!(v.cached_item_size(&3), Some(60));
}

#[test]
fn custom_adjust_policy_overrides_default() {
    let (options, requests) = recording(
        list(100, 50, 500).with_should_adjust_scroll_position_on_item_size_change(Some(
            |_: &Virtualizer, _: &VirtualItem, _| false,
        )),
    );
    let mut v = attached(options);
    v.on_offset(200, false);
    requests.lock().unwrap().clear();

    v.resize_item(1, 80);
    assert_eq!(v.pending_adjustment(), 0);
    assert!(requests.lock().unwrap().is_empty());
}

#[test]
fn direct_executor_applies_adjustments() {
    let mut v = attached(list(100, 50, 500));
    v.on_offset(200, false);
    v.resize_item(0, 100);
    assert_eq!(v.scroll_offset(), 250);
    assert_eq!(v.pending_adjustment(), 0);
}

#[test]
fn measure_element_records_size_and_enters_dynamic_mode() {
    let mut v = attached(list(100, 50, 500));
    assert!(!v.is_dynamic_mode());

    v.measure_element(&FakeElement::item(3, 70));
    assert!(v.is_dynamic_mode());
    assert_eq!(v.cached_item_size(&3), Some(70));
    assert_eq!(v.get_measurements()[4].start, 220);

    v.measure_element_with_entry(
        &FakeElement::item(3, 70),
        Some(&ResizeEntry {
            border_box_size: Some(90),
        }),
    );
    assert_eq!(v.cached_item_size(&3), Some(90));

    v.measure_element(&FakeElement::item(3, 70).disconnected());
    assert!(!v.is_dynamic_mode());
    assert_eq!(v.cached_item_size(&3), Some(90));
}

#[test]
fn custom_measurer_is_used() {
    let mut v = attached(list(10, 50, 500).with_measure_element(Some(
        |el: &dyn ItemElement, _: Option<&ResizeEntry>, _: &Virtualizer| el.size(false) * 2,
    )));
    v.measure_element(&FakeElement::item(1, 30));
    assert_eq!(v.cached_item_size(&1), Some(60));
}

#[test]
fn index_attribute_errors() {
    let v = Virtualizer::new(list(10, 50, 500));
    assert_eq!(
        v.try_index_from_element(&FakeElement::bare(10)),
        Err(IndexAttributeError::Missing {
            attribute: "data-index".to_string()
        })
    );
    assert_eq!(
        v.try_index_from_element(&FakeElement::bare(10).with_attribute("data-index", "abc")),
        Err(IndexAttributeError::Invalid {
            attribute: "data-index".to_string(),
            value: "abc".to_string()
        })
    );
    assert_eq!(v.index_from_element(&FakeElement::bare(10)), None);

    let v = Virtualizer::new(list(10, 50, 500).with_index_attribute("data-row"));
    assert_eq!(
        v.try_index_from_element(&FakeElement::bare(10).with_attribute("data-row", "7")),
        Ok(7)
    );
}

#[test]
fn unmapped_elements_are_not_measured() {
    let mut v = attached(list(10, 50, 500));
    v.measure_element(&FakeElement::bare(70));
    v.measure_element(&FakeElement::item(99, 70));
    assert_eq!(v.measurement_cache_len(), 0);
    assert!(!v.is_dynamic_mode());
}

#[test]
fn measure_clears_sizes() {
    let mut v = attached(list(10, 50, 500));
    v.measure_element(&FakeElement::item(2, 80));
    assert_eq!(v.get_total_size(), 530);

    v.measure();
    assert_eq!(v.measurement_cache_len(), 0);
    assert_eq!(v.get_measurements()[2].size, 50);
    assert_eq!(v.get_total_size(), 500);
}

#[test]
fn sizes_follow_keys_across_reorder() {
    let mut v = Virtualizer::new(VirtualizerOptions::new_with_key(
        3,
        |_| 50,
        |i| [10u64, 20, 30][i],
    ));
    v.resize_item(0, 80);
    assert_eq!(v.cached_item_size(&10), Some(80));

    v.update_options(|o| o.get_item_key = Arc::new(|i: usize| [30u64, 10, 20][i]));
    let m = v.get_measurements();
    assert_eq!(m[1].key, 10);
    assert_eq!(m[1].size, 80);
    assert_eq!(m[2].start, 130);
}

#[test]
fn initial_measurements_cache_seeds_sizes() {
    let mut first = attached(list(10, 50, 500));
    first.measure_element(&FakeElement::item(0, 20));
    first.measure_element(&FakeElement::item(4, 90));
    let snapshot = first.measurements_snapshot();

    let mut second = Virtualizer::new(list(10, 50, 500).with_initial_measurements_cache(snapshot.clone()));
    assert_eq!(second.cached_item_size(&4), Some(90));
    assert_eq!(second.get_measurements(), &snapshot[..]);
}

#[test]
fn detach_keeps_sizes_and_forgets_elements() {
    let mut v = attached(list(100, 50, 500));
    v.measure_element(&FakeElement::item(1, 70));
    v.scroll_to_index(60, ScrollToIndexOptions::default());
    assert!(v.has_pending_scroll());

    v.detach();
    assert!(!v.is_attached());
    assert!(!v.has_pending_scroll());
    assert!(!v.is_dynamic_mode());
    assert_eq!(v.cached_item_size(&1), Some(70));
}

#[test]
fn deferred_scroll_to_index_retries_until_mounted() {
    let mut v = attached(list(100, 50, 500));
    v.measure_element(&FakeElement::item(0, 50));
    assert!(v.is_dynamic_mode());

    v.scroll_to_index(50, ScrollToIndexOptions::align(Align::Start));
    assert_eq!(v.scroll_offset(), 2500);
    assert!(v.has_pending_scroll());

    // Target not rendered yet: the retry re-issues and re-arms.
    v.tick(16);
    assert!(v.has_pending_scroll());
    assert_eq!(v.scroll_offset(), 2500);

    v.measure_element(&FakeElement::item(50, 50));
    v.tick(32);
    assert!(!v.has_pending_scroll());
    assert_eq!(v.scroll_offset(), 2500);
}

#[test]
fn deferred_scroll_to_index_is_cancelled_by_other_scrolls() {
    let mut v = attached(list(100, 50, 500));
    v.measure_element(&FakeElement::item(0, 50));

    v.scroll_to_index(50, ScrollToIndexOptions::default());
    assert!(v.has_pending_scroll());
    v.scroll_by(10, None);
    assert!(!v.has_pending_scroll());

    v.scroll_to_index(50, ScrollToIndexOptions::default().with_behavior(ScrollBehavior::Smooth));
    assert!(!v.has_pending_scroll());
}

#[test]
fn deferred_scroll_to_index_respects_retry_cap() {
    let mut v = attached(list(100, 50, 500).with_max_scroll_to_index_retries(Some(2)));
    v.measure_element(&FakeElement::item(0, 50));

    v.scroll_to_index(50, ScrollToIndexOptions::default());
    v.tick(16);
    assert!(v.has_pending_scroll());
    v.tick(32);
    assert!(v.has_pending_scroll());
    v.tick(48);
    assert!(!v.has_pending_scroll());
}

#[test]
fn is_scrolling_resets_after_delay() {
    let mut v = attached(list(100, 50, 500));
    v.apply_scroll_event(100, 1000);
    assert!(v.is_scrolling());
    assert_eq!(v.scroll_direction(), Some(ScrollDirection::Forward));

    v.tick(1100);
    assert!(v.is_scrolling());

    v.apply_scroll_event(60, 1120);
    assert_eq!(v.scroll_direction(), Some(ScrollDirection::Backward));
    v.tick(1200);
    assert!(v.is_scrolling());

    v.tick(1270);
    assert!(!v.is_scrolling());
    assert_eq!(v.scroll_direction(), None);
    assert_eq!(v.scroll_offset(), 60);
}

#[test]
fn scrollend_event_disables_debounce() {
    let mut v = attached(list(100, 50, 500).with_use_scrollend_event(true));
    v.apply_scroll_event(100, 1000);
    v.tick(10_000);
    assert!(v.is_scrolling());
    v.on_offset(100, false);
    assert!(!v.is_scrolling());
}

#[test]
fn on_change_fires_only_when_range_or_scrolling_changes() {
    let calls: Arc<Mutex<Vec<bool>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let mut v = attached(list(100, 50, 500).with_on_change(Some(
        move |_: &Virtualizer, sync| {
            sink.lock().unwrap().push(sync);
        },
    )));
    calls.lock().unwrap().clear();

    v.on_offset(10, true);
    assert_eq!(*calls.lock().unwrap(), [true]);
    // Same range, still scrolling.
    v.on_offset(20, true);
    assert_eq!(calls.lock().unwrap().len(), 1);
    v.on_offset(20, false);
    assert_eq!(*calls.lock().unwrap(), [true, false]);
    v.on_offset(2000, false);
    assert_eq!(calls.lock().unwrap().len(), 3);
}

#[test]
fn batch_update_coalesces_notifications() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut v = attached(list(100, 50, 500).with_on_change(Some(
        move |_: &Virtualizer, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        },
    )));
    calls.store(0, Ordering::Relaxed);

    v.batch_update(|v| {
        v.resize_item(1, 60);
        v.resize_item(2, 70);
        v.on_offset(1000, true);
    });
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn virtual_items_are_memoized() {
    let mut v = attached(list(100, 50, 500));
    v.on_offset(10, false);
    let first = v.get_virtual_items().as_ptr();
    let again = v.get_virtual_items().as_ptr();
    assert_eq!(first, again);

    // Same visible range: the item list is reused.
    v.on_offset(20, false);
    assert_eq!(v.get_virtual_items().as_ptr(), first);

    v.on_offset(2000, false);
    assert_ne!(v.get_virtual_items().as_ptr(), first);
    assert_eq!(v.get_virtual_items()[0].index, 39);
}

#[test]
fn disabled_virtualizer_is_empty() {
    let mut v = attached(list(100, 50, 500).with_enabled(false).with_padding(4, 6));
    assert!(v.get_measurements().is_empty());
    assert!(v.get_virtual_items().is_empty());
    assert_eq!(v.get_total_size(), 10);
    assert_eq!(v.get_offset_for_index(3, Align::Start), None);

    v.update_options(|o| o.enabled = true);
    assert_eq!(v.get_measurements().len(), 100);
}

#[test]
fn horizontal_uses_width() {
    let mut v = Virtualizer::new(
        VirtualizerOptions::new(100, |_| 50)
            .with_horizontal(true)
            .with_initial_rect(Some(Rect::new(300, 10))),
    );
    assert_eq!(v.viewport_size(), 300);
    assert_eq!(v.calculate_range().map(|r| r.end_index), Some(5));

    v.on_rect(Rect::new(600, 10));
    assert_eq!(v.calculate_range().map(|r| r.end_index), Some(11));
}

#[test]
fn memo_recomputes_only_on_changed_deps() {
    let mut memo: Memo<(u32, u32), u32> = Memo::new("sum");
    let mut runs = 0;
    assert_eq!(
        *memo.get((1, 2), |&(a, b)| {
            runs += 1;
            a + b
        }),
        3
    );
    assert_eq!(
        *memo.get((1, 2), |&(a, b)| {
            runs += 1;
            a + b
        }),
        3
    );
    assert_eq!(runs, 1);
    memo.get((2, 2), |&(a, b)| a + b);
    assert_eq!(memo.peek(), Some(&4));
    memo.invalidate();
    assert_eq!(memo.peek(), None);
}

#[test]
fn by_address_compares_identity() {
    let a: Arc<[u32]> = Arc::from(alloc::vec![1, 2, 3]);
    let b: Arc<[u32]> = Arc::from(alloc::vec![1, 2, 3]);
    assert_eq!(ByAddress::new(&a), ByAddress(Arc::clone(&a)));
    assert_ne!(ByAddress::new(&a), ByAddress::new(&b));
}

#[test]
fn replacing_estimate_size_rebuilds_measurements() {
    let mut v = Virtualizer::new(list(10, 50, 500));
    assert_eq!(v.get_total_size(), 500);
    v.update_options(|o| o.estimate_size = Arc::new(|_: usize| 20u32));
    assert_eq!(v.get_total_size(), 200);
    v.update_options(|o| o.count = 5);
    assert_eq!(v.get_total_size(), 100);
}

fn sizes_strategy() -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..=120, 1..=200)
}

fn sized(sizes: &[u32], viewport: u32) -> VirtualizerOptions {
    let sizes: Arc<[u32]> = Arc::from(sizes);
    VirtualizerOptions::new(sizes.len(), move |i| sizes[i])
        .with_initial_rect(Some(Rect::new(0, viewport)))
}

proptest! {
    #[test]
    fn items_are_contiguous(sizes in sizes_strategy(), gap in 0u32..=16, padding in 0u32..=64) {
        let mut v = Virtualizer::new(sized(&sizes, 500).with_gap(gap).with_padding(padding, 0));
        let m = v.get_measurements();
        prop_assert_eq!(m[0].start, padding as u64);
        for (i, item) in m.iter().enumerate() {
            prop_assert_eq!(item.end, item.start + item.size as u64);
            if i > 0 {
                prop_assert_eq!(item.start, m[i - 1].end + gap as u64);
            }
        }
    }

    #[test]
    fn multi_lane_items_are_well_formed(sizes in sizes_strategy(), lanes in 1usize..=5) {
        let mut v = Virtualizer::new(sized(&sizes, 500).with_lanes(lanes));
        for item in v.get_measurements() {
            prop_assert_eq!(item.end, item.start + item.size as u64);
            prop_assert!(item.lane < lanes);
        }
    }

    #[test]
    fn range_stays_in_bounds(
        sizes in sizes_strategy(),
        lanes in 1usize..=4,
        viewport in 1u32..=1000,
        offset_frac in 0.0f64..=1.2,
    ) {
        let mut v = attached(sized(&sizes, viewport).with_lanes(lanes));
        let total = v.get_total_size();
        v.on_offset((total as f64 * offset_frac) as u64, false);
        let range = v.calculate_range().unwrap();
        prop_assert!(range.start_index <= range.end_index);
        prop_assert!(range.end_index < sizes.len());
        for &i in v.get_virtual_indexes() {
            prop_assert!(i < sizes.len());
        }
    }

    #[test]
    fn resize_above_offset_keeps_content_still(
        sizes in sizes_strategy(),
        pick in any::<prop::sample::Index>(),
        new_size in 1u32..=300,
        extra in 0u64..=200,
    ) {
        let index = pick.index(sizes.len());
        let mut v = attached(sized(&sizes, 300));
        let item_end = v.get_measurements()[index].end;
        v.on_offset(item_end + extra, false);
        let offset = v.scroll_offset();
        prop_assume!(offset == item_end + extra);

        let before: Vec<i64> = v.get_measurements()[index + 1..]
            .iter()
            .map(|m| m.start as i64 - offset as i64)
            .collect();
        v.resize_item(index, new_size);
        let offset = v.scroll_offset() as i64;
        let after: Vec<i64> = v.get_measurements()[index + 1..]
            .iter()
            .map(|m| m.start as i64 - offset)
            .collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn multi_lane_resize_matches_full_layout(
        sizes in sizes_strategy(),
        lanes in 1usize..=5,
        gap in 0u32..=8,
        resizes in proptest::collection::vec((any::<prop::sample::Index>(), 1u32..=150), 1..6),
    ) {
        let mut v = Virtualizer::new(sized(&sizes, 500).with_lanes(lanes).with_gap(gap));
        let mut sizes = sizes;
        v.get_measurements();
        for (pick, size) in resizes {
            let index = pick.index(sizes.len());
            v.resize_item(index, size);
            sizes[index] = size;
            v.get_measurements();
        }

        let layout = |v: &mut Virtualizer| -> Vec<(usize, u64, u32, usize)> {
            v.get_measurements()
                .iter()
                .map(|m| (m.index, m.start, m.size, m.lane))
                .collect()
        };
        let mut full = Virtualizer::new(sized(&sizes, 500).with_lanes(lanes).with_gap(gap));
        prop_assert_eq!(layout(&mut v), layout(&mut full));
        prop_assert_eq!(v.get_total_size(), full.get_total_size());
    }

    #[test]
    fn scroll_to_index_brings_item_into_view(
        index in 0usize..100,
        start in 0u64..=4500,
        align in prop_oneof![Just(Align::Auto), Just(Align::Start), Just(Align::Center), Just(Align::End)],
    ) {
        let mut v = attached(list(100, 50, 500).with_scroll_padding(10, 10));
        v.on_offset(start, false);
        v.scroll_to_index(index, ScrollToIndexOptions::align(align));
        let offset = v.scroll_offset();
        let item = v.get_measurements()[index].clone();
        prop_assert!(item.start < offset + 500 + 10);
        prop_assert!(item.end + 10 > offset);
    }
}
