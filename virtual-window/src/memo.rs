//! Dependency-tracked caching.
//!
//! Every derived quantity of the engine (measurements, range, indexes, items) is a pure function
//! of an explicit dependency tuple. A [`Memo`] keeps the last tuple and result and only reruns
//! the function when the new tuple differs.
//!
//! Anything the compute function reads must be part of its tuple; reading a value that is not
//! tracked yields stale results.

use alloc::sync::Arc;
use core::fmt;

/// Compares an `Arc` by identity rather than by value.
///
/// Closures and shared containers go into dependency tuples through this wrapper, so replacing
/// an `Arc` (even with an equal value) invalidates the memo while cloning it does not.
pub struct ByAddress<T: ?Sized>(pub Arc<T>);

impl<T: ?Sized> ByAddress<T> {
    pub fn new(value: &Arc<T>) -> Self {
        Self(Arc::clone(value))
    }
}

impl<T: ?Sized> Clone for ByAddress<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T: ?Sized> PartialEq for ByAddress<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Eq for ByAddress<T> {}

impl<T: ?Sized> fmt::Debug for ByAddress<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByAddress({:p})", Arc::as_ptr(&self.0))
    }
}

/// A single-slot memo cell.
#[derive(Clone)]
pub struct Memo<D, T> {
    label: &'static str,
    slot: Option<(D, T)>,
}

impl<D: PartialEq, T> Memo<D, T> {
    pub fn new(label: &'static str) -> Self {
        Self { label, slot: None }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Returns the cached value if `deps` matches the previous call, recomputing otherwise.
    pub fn get(&mut self, deps: D, compute: impl FnOnce(&D) -> T) -> &T {
        self.get_traced(false, || deps, compute)
    }

    /// Like [`Memo::get`], but gathers the dependencies lazily and, when `debug` is set and the
    /// `tracing` feature is enabled, logs how long gathering and recomputation took.
    pub fn get_traced(
        &mut self,
        debug: bool,
        deps: impl FnOnce() -> D,
        compute: impl FnOnce(&D) -> T,
    ) -> &T {
        let timer = Stopwatch::start(debug);
        let deps = deps();
        let deps_elapsed = timer.elapsed_us();

        let hit = matches!(&self.slot, Some((prev, _)) if *prev == deps);
        if !hit {
            let timer = Stopwatch::start(debug);
            let value = compute(&deps);
            let compute_elapsed = timer.elapsed_us();
            self.slot = Some((deps, value));
            if debug {
                let _ = (deps_elapsed, compute_elapsed);
                vdebug!(
                    memo = self.label,
                    deps_us = deps_elapsed,
                    compute_us = compute_elapsed,
                    "memo recomputed"
                );
            }
        }

        match &self.slot {
            Some((_, value)) => value,
            None => unreachable!("memo slot filled above"),
        }
    }

    /// Returns the cached value without checking dependencies.
    pub fn peek(&self) -> Option<&T> {
        self.slot.as_ref().map(|(_, v)| v)
    }

    /// Drops the cached value; the next `get` recomputes unconditionally.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

impl<D, T> fmt::Debug for Memo<D, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("label", &self.label)
            .field("cached", &self.slot.is_some())
            .finish()
    }
}

#[cfg(feature = "tracing")]
struct Stopwatch(Option<std::time::Instant>);

#[cfg(feature = "tracing")]
impl Stopwatch {
    fn start(enabled: bool) -> Self {
        Self(enabled.then(std::time::Instant::now))
    }

    fn elapsed_us(&self) -> u64 {
        self.0
            .map(|t| t.elapsed().as_micros() as u64)
            .unwrap_or_default()
    }
}

#[cfg(not(feature = "tracing"))]
struct Stopwatch;

#[cfg(not(feature = "tracing"))]
impl Stopwatch {
    fn start(_enabled: bool) -> Self {
        Self
    }

    fn elapsed_us(&self) -> u64 {
        0
    }
}
