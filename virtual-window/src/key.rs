#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

/// Measured sizes keyed by item key, so they follow items across index shuffles.
#[cfg(feature = "std")]
pub(crate) type KeySizeMap<K> = HashMap<K, u32>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySizeMap<K> = BTreeMap<K, u32>;

/// Keys that currently have a live (connected) element.
#[cfg(feature = "std")]
pub(crate) type KeySet<K> = HashSet<K>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySet<K> = BTreeSet<K>;

#[cfg(feature = "std")]
#[doc(hidden)]
pub trait KeyCacheKey: core::hash::Hash + Eq + Clone {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq + Clone> KeyCacheKey for K {}

#[cfg(not(feature = "std"))]
#[doc(hidden)]
pub trait KeyCacheKey: Ord + Clone {}
#[cfg(not(feature = "std"))]
impl<K: Ord + Clone> KeyCacheKey for K {}
