//! Converts item sizes into absolute positions.
//!
//! Positions are rebuilt lazily. A change to any of the [`MeasurementOptions`] rebuilds the
//! whole sequence; a size change only rebuilds the suffix starting at the lowest dirty index,
//! since every position before it depends only on sizes that did not change.

use alloc::vec::Vec;
use core::cmp;

use crate::VirtualItem;
use crate::key::{KeyCacheKey, KeySizeMap};
use crate::memo::ByAddress;
use crate::options::{EstimateSizeFn, GetItemKeyFn};

/// The dependency tuple of the measurement pass.
pub(crate) struct MeasurementOptions<K> {
    pub(crate) count: usize,
    pub(crate) padding_start: u32,
    pub(crate) scroll_margin: u32,
    pub(crate) gap: u32,
    pub(crate) lanes: usize,
    pub(crate) enabled: bool,
    pub(crate) estimate_size: ByAddress<EstimateSizeFn>,
    pub(crate) get_item_key: ByAddress<GetItemKeyFn<K>>,
}

impl<K> Clone for MeasurementOptions<K> {
    fn clone(&self) -> Self {
        Self {
            count: self.count,
            padding_start: self.padding_start,
            scroll_margin: self.scroll_margin,
            gap: self.gap,
            lanes: self.lanes,
            enabled: self.enabled,
            estimate_size: self.estimate_size.clone(),
            get_item_key: self.get_item_key.clone(),
        }
    }
}

impl<K> PartialEq for MeasurementOptions<K> {
    fn eq(&self, other: &Self) -> bool {
        self.count == other.count
            && self.padding_start == other.padding_start
            && self.scroll_margin == other.scroll_margin
            && self.gap == other.gap
            && self.lanes == other.lanes
            && self.enabled == other.enabled
            && self.estimate_size == other.estimate_size
            && self.get_item_key == other.get_item_key
    }
}

pub(crate) struct MeasurementCache<K> {
    items: Vec<VirtualItem<K>>,
    sizes: KeySizeMap<K>,
    /// Bumped on every size map mutation; stands in for the map's identity in the deps tuple.
    generation: u64,
    /// Lowest index whose size changed since the last pass.
    dirty_from: Option<usize>,
    /// Bumped every time `items` is rebuilt; the identity of the sequence for downstream memos.
    version: u64,
    last: Option<(MeasurementOptions<K>, u64)>,
    lanes: LaneScratch,
}

impl<K: KeyCacheKey> MeasurementCache<K> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            sizes: KeySizeMap::<K>::new(),
            generation: 0,
            dirty_from: None,
            version: 0,
            last: None,
            lanes: LaneScratch::default(),
        }
    }

    /// The sequence produced by the last [`MeasurementCache::compute`] call.
    pub(crate) fn items(&self) -> &[VirtualItem<K>] {
        &self.items
    }

    pub(crate) fn version(&self) -> u64 {
        self.version
    }

    pub(crate) fn cached_size(&self, key: &K) -> Option<u32> {
        self.sizes.get(key).copied()
    }

    pub(crate) fn cached_len(&self) -> usize {
        self.sizes.len()
    }

    pub(crate) fn for_each_cached_size(&self, mut f: impl FnMut(&K, u32)) {
        for (k, v) in self.sizes.iter() {
            f(k, *v);
        }
    }

    /// Records a size for `key` without marking anything dirty (used to seed the map).
    pub(crate) fn seed_size(&mut self, key: K, size: u32) {
        self.sizes.entry(key).or_insert(size);
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn set_size(&mut self, index: usize, key: K, size: u32) {
        self.sizes.insert(key, size);
        self.dirty_from = Some(self.dirty_from.map_or(index, |d| cmp::min(d, index)));
        self.generation = self.generation.wrapping_add(1);
    }

    pub(crate) fn clear_sizes(&mut self) {
        self.sizes.clear();
        self.dirty_from = Some(0);
        self.generation = self.generation.wrapping_add(1);
    }

    /// Brings the item sequence up to date with `options` and the size map.
    pub(crate) fn compute(&mut self, options: &MeasurementOptions<K>) -> &[VirtualItem<K>] {
        let options_unchanged = matches!(&self.last, Some((prev, _)) if prev == options);
        if options_unchanged
            && matches!(&self.last, Some((_, generation)) if *generation == self.generation)
        {
            return &self.items;
        }
        self.last = Some((options.clone(), self.generation));
        self.version = self.version.wrapping_add(1);

        if !options.enabled {
            self.items.clear();
            self.dirty_from = None;
            return &self.items;
        }

        let from = if options_unchanged {
            self.dirty_from.take().unwrap_or(0)
        } else {
            self.dirty_from = None;
            0
        };
        let from = from.min(self.items.len()).min(options.count);
        vtrace!(
            from,
            count = options.count,
            lanes = options.lanes,
            "measurements: recompute"
        );

        self.items.truncate(from);
        self.items.reserve(options.count.saturating_sub(from));

        let lanes = options.lanes.max(1);
        let base = options.padding_start as u64 + options.scroll_margin as u64;
        let gap = options.gap as u64;

        for i in from..options.count {
            let key = (options.get_item_key.0)(i);
            let predecessor = if lanes == 1 {
                i.checked_sub(1)
            } else {
                self.lanes.furthest(&self.items, i, lanes)
            };
            let (start, lane) = match predecessor {
                Some(p) => {
                    let p = &self.items[p];
                    (p.end.saturating_add(gap), p.lane)
                }
                None => (base, i % lanes),
            };
            let size = self
                .sizes
                .get(&key)
                .copied()
                .unwrap_or_else(|| (options.estimate_size.0)(i));

            self.items.push(VirtualItem {
                key,
                index: i,
                start,
                end: start.saturating_add(size as u64),
                size,
                lane,
            });
        }

        &self.items
    }
}

/// Reusable buffers for the backward lane scan.
#[derive(Default)]
struct LaneScratch {
    furthest: Vec<Option<usize>>,
    settled: Vec<bool>,
}

impl LaneScratch {
    /// Finds the item that `index` should be placed after in a multi-lane layout.
    ///
    /// Scans backward keeping, per lane, the item with the greatest `end`. A lane is settled once
    /// an earlier item with a smaller `end` shows up behind its candidate. Returns `None` until
    /// every lane has a candidate; otherwise the candidate with the smallest `end` (lowest index
    /// on ties).
    fn furthest<K>(&mut self, items: &[VirtualItem<K>], index: usize, lanes: usize) -> Option<usize> {
        self.furthest.clear();
        self.furthest.resize(lanes, None);
        self.settled.clear();
        self.settled.resize(lanes, false);

        let mut found = 0usize;
        let mut settled = 0usize;
        for m in (0..index).rev() {
            let item = &items[m];
            let lane = item.lane;
            if lane >= lanes || self.settled[lane] {
                continue;
            }
            match self.furthest[lane] {
                None => {
                    self.furthest[lane] = Some(m);
                    found += 1;
                }
                Some(prev) => {
                    let prev_end = items[prev].end;
                    if item.end > prev_end {
                        self.furthest[lane] = Some(m);
                    } else if item.end < prev_end {
                        self.settled[lane] = true;
                        settled += 1;
                    }
                }
            }
            if settled == lanes {
                break;
            }
        }

        if found < lanes {
            return None;
        }
        self.furthest
            .iter()
            .flatten()
            .copied()
            .min_by(|&a, &b| {
                items[a]
                    .end
                    .cmp(&items[b].end)
                    .then(items[a].index.cmp(&items[b].index))
            })
    }
}
