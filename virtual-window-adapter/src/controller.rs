use std::fmt;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use virtual_window::{KeyCacheKey, ScrollToFn, ScrollToOptions, Virtualizer, VirtualizerOptions};

use crate::element::{ScrollElement, element_scroll};
use crate::observe::{
    ObserveConfig, ObserveOffsetFn, ObserveRectFn, Observation, ObservationSink, Unsubscribe,
    observe_offset_once, observe_rect_once,
};

/// Returns the scroll container, or `None` while there is none (e.g. not mounted yet).
pub type GetScrollElementFn = Arc<dyn Fn() -> Option<Arc<dyn ScrollElement>> + Send + Sync>;

/// Host-side collaborators of a [`Controller`].
#[derive(Clone)]
pub struct AdapterOptions {
    pub get_scroll_element: GetScrollElementFn,
    pub observe_element_rect: ObserveRectFn,
    pub observe_element_offset: ObserveOffsetFn,
}

impl AdapterOptions {
    /// Uses the one-shot observers; the host reports later changes through [`Controller::sink`].
    pub fn new(
        get_scroll_element: impl Fn() -> Option<Arc<dyn ScrollElement>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            get_scroll_element: Arc::new(get_scroll_element),
            observe_element_rect: Arc::new(observe_rect_once),
            observe_element_offset: Arc::new(observe_offset_once),
        }
    }

    pub fn with_observe_element_rect(
        mut self,
        f: impl Fn(&Arc<dyn ScrollElement>, ObserveConfig, ObservationSink) -> Unsubscribe
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.observe_element_rect = Arc::new(f);
        self
    }

    pub fn with_observe_element_offset(
        mut self,
        f: impl Fn(&Arc<dyn ScrollElement>, ObserveConfig, ObservationSink) -> Unsubscribe
        + Send
        + Sync
        + 'static,
    ) -> Self {
        self.observe_element_offset = Arc::new(f);
        self
    }
}

impl fmt::Debug for AdapterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdapterOptions").finish_non_exhaustive()
    }
}

/// A framework-neutral controller that wraps a `virtual_window::Virtualizer` and connects it to
/// a scroll container.
///
/// This type does not hold any UI objects beyond the [`ScrollElement`] handle. Adapters drive
/// it by calling:
/// - `sync_scroll_element` after mounting/updating (attaches, re-attaches or detaches)
/// - `pump(now_ms)` each frame/timer tick to apply queued observations and advance the engine
///   clock (`is_scrolling` debouncing, deferred `scroll_to_index` retries)
pub struct Controller<K> {
    v: Virtualizer<K>,
    adapter: AdapterOptions,
    element: Option<Arc<dyn ScrollElement>>,
    /// Element scroll executor for the current element. Installed into the engine whenever its
    /// options carry no `scroll_to_fn`.
    executor: Option<ScrollToFn<K>>,
    sink: ObservationSink,
    rx: Receiver<Observation>,
    unsubscribes: Vec<Unsubscribe>,
}

impl<K: KeyCacheKey + 'static> Controller<K> {
    pub fn new(options: VirtualizerOptions<K>, adapter: AdapterOptions) -> Self {
        Self::from_virtualizer(Virtualizer::new(options), adapter)
    }

    pub fn from_virtualizer(v: Virtualizer<K>, adapter: AdapterOptions) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            v,
            adapter,
            element: None,
            executor: None,
            sink: ObservationSink::new(tx),
            rx,
            unsubscribes: Vec::new(),
        }
    }

    pub fn virtualizer(&self) -> &Virtualizer<K> {
        &self.v
    }

    /// Mutable access to the engine.
    ///
    /// Replace options through [`Controller::set_options`]: options set directly on the engine
    /// lose the element executor until the next `pump`.
    pub fn virtualizer_mut(&mut self) -> &mut Virtualizer<K> {
        &mut self.v
    }

    /// Replaces the engine options, keeping the element executor when `options` has no
    /// `scroll_to_fn` of its own.
    pub fn set_options(&mut self, mut options: VirtualizerOptions<K>) {
        if options.scroll_to_fn.is_none() {
            options.scroll_to_fn = self.executor.clone();
        }
        self.v.set_options(options);
    }

    /// Clones the current options, applies `f`, then delegates to [`Controller::set_options`].
    pub fn update_options(&mut self, f: impl FnOnce(&mut VirtualizerOptions<K>)) {
        let mut next = self.v.options().clone();
        f(&mut next);
        self.set_options(next);
    }

    /// A sink for host event handlers that report rect/offset changes directly.
    pub fn sink(&self) -> ObservationSink {
        self.sink.clone()
    }

    pub fn scroll_element(&self) -> Option<&Arc<dyn ScrollElement>> {
        self.element.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.element.is_some()
    }

    /// Re-reads `get_scroll_element` and reconnects when it changed.
    ///
    /// On a new element: ends the previous subscriptions, installs the element scroll executor
    /// (unless the options carry their own `scroll_to_fn`), attaches the engine and then
    /// subscribes the observers, so they report the position after the initial scroll. When the
    /// element went away the engine is detached.
    ///
    /// Returns whether anything changed.
    pub fn sync_scroll_element(&mut self) -> bool {
        let next = (self.adapter.get_scroll_element)();
        let unchanged = match (&self.element, &next) {
            (Some(cur), Some(next)) => Arc::ptr_eq(cur, next),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return false;
        }

        self.teardown();
        let Some(element) = next else {
            adebug!("scroll element removed; detached");
            return true;
        };
        adebug!("scroll element changed; attaching");

        let target = Arc::clone(&element);
        let executor: ScrollToFn<K> = Arc::new(
            move |offset: u64, options: ScrollToOptions, v: &Virtualizer<K>| {
                element_scroll(&*target, offset, options, v)
            },
        );
        let previous = self.executor.replace(Arc::clone(&executor));
        let stale = match (&self.v.options().scroll_to_fn, &previous) {
            (None, _) => true,
            (Some(current), Some(previous)) => Arc::ptr_eq(current, previous),
            (Some(_), None) => false,
        };
        if stale {
            self.v.update_options(|o| o.scroll_to_fn = Some(executor));
        }

        self.element = Some(Arc::clone(&element));
        self.v.attach();

        let config = ObserveConfig {
            horizontal: self.v.options().horizontal,
            is_rtl: self.v.options().is_rtl,
        };
        self.unsubscribes.push((self.adapter.observe_element_rect)(
            &element,
            config,
            self.sink.clone(),
        ));
        self.unsubscribes.push((self.adapter.observe_element_offset)(
            &element,
            config,
            self.sink.clone(),
        ));
        true
    }

    /// Applies queued observations, then advances the engine clock.
    ///
    /// All observations of one pump produce at most one `on_change` notification. Returns the
    /// number of observations applied.
    pub fn pump(&mut self, now_ms: u64) -> usize {
        self.restore_executor();
        let rx = &self.rx;
        let mut applied = 0usize;
        self.v.batch_update(|v| {
            for observation in rx.try_iter() {
                applied += 1;
                match observation {
                    Observation::Rect(rect) => v.on_rect(rect),
                    Observation::Offset {
                        offset,
                        is_scrolling: true,
                    } => v.apply_scroll_event(offset, now_ms),
                    Observation::Offset {
                        offset,
                        is_scrolling: false,
                    } => v.on_offset(offset, false),
                }
            }
        });
        if applied > 0 {
            atrace!(applied, now_ms, "pump");
        }
        self.v.tick(now_ms);
        applied
    }

    /// Ends the observer subscriptions and detaches the engine. Measured sizes are kept.
    pub fn detach(&mut self) {
        self.teardown();
    }

    /// Reinstalls the element executor after options without a `scroll_to_fn` were set directly
    /// on the engine.
    fn restore_executor(&mut self) {
        if self.element.is_none() || self.v.options().scroll_to_fn.is_some() {
            return;
        }
        if let Some(executor) = self.executor.clone() {
            adebug!("scroll_to_fn cleared by set_options; reinstalling element executor");
            self.v.update_options(|o| o.scroll_to_fn = Some(executor));
        }
    }

    fn teardown(&mut self) {
        for unsubscribe in self.unsubscribes.drain(..) {
            unsubscribe();
        }
        if self.element.take().is_some() {
            self.v.detach();
        }
    }
}

impl<K> Drop for Controller<K> {
    fn drop(&mut self) {
        for unsubscribe in self.unsubscribes.drain(..) {
            unsubscribe();
        }
    }
}

impl<K> fmt::Debug for Controller<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("v", &self.v)
            .field("attached", &self.element.is_some())
            .field("subscriptions", &self.unsubscribes.len())
            .finish_non_exhaustive()
    }
}
