use std::sync::Arc;
use std::sync::mpsc::Sender;

use thiserror::Error;
use virtual_window::Rect;

use crate::element::{ScrollElement, element_offset};

/// A change reported by an observer subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Observation {
    Rect(Rect),
    Offset { offset: u64, is_scrolling: bool },
}

/// Axis information an observer needs to read the element.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObserveConfig {
    pub horizontal: bool,
    pub is_rtl: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("observation sink closed: the controller was dropped")]
pub struct SinkClosed;

/// Where observer subscriptions deliver their notifications.
///
/// Notifications are queued and applied to the engine by `Controller::pump`, never re-entrantly.
#[derive(Clone, Debug)]
pub struct ObservationSink {
    tx: Sender<Observation>,
}

impl ObservationSink {
    pub(crate) fn new(tx: Sender<Observation>) -> Self {
        Self { tx }
    }

    pub fn emit(&self, observation: Observation) -> Result<(), SinkClosed> {
        self.tx.send(observation).map_err(|_| SinkClosed)
    }

    pub fn rect(&self, rect: Rect) -> Result<(), SinkClosed> {
        self.emit(Observation::Rect(rect))
    }

    pub fn offset(&self, offset: u64, is_scrolling: bool) -> Result<(), SinkClosed> {
        self.emit(Observation::Offset {
            offset,
            is_scrolling,
        })
    }
}

/// Ends an observer subscription.
pub type Unsubscribe = Box<dyn FnOnce() + Send>;

/// Subscribes to size changes of the scroll element.
///
/// Must report the current rect immediately, then every change.
pub type ObserveRectFn =
    Arc<dyn Fn(&Arc<dyn ScrollElement>, ObserveConfig, ObservationSink) -> Unsubscribe + Send + Sync>;

/// Subscribes to scroll offset changes of the scroll element.
///
/// Must report the current offset immediately (`is_scrolling = false`), then every scroll tick
/// (`is_scrolling = true`) and, when the host can detect it, the end of scrolling.
pub type ObserveOffsetFn =
    Arc<dyn Fn(&Arc<dyn ScrollElement>, ObserveConfig, ObservationSink) -> Unsubscribe + Send + Sync>;

fn noop() -> Unsubscribe {
    Box::new(|| {})
}

/// Reports the element's current rect once. Later changes are left to the host, through
/// `Controller::sink`.
pub fn observe_rect_once(
    element: &Arc<dyn ScrollElement>,
    _config: ObserveConfig,
    sink: ObservationSink,
) -> Unsubscribe {
    let _ = sink.rect(element.client_rect());
    noop()
}

/// Reports the element's current offset once. Later changes are left to the host, through
/// `Controller::sink`.
pub fn observe_offset_once(
    element: &Arc<dyn ScrollElement>,
    config: ObserveConfig,
    sink: ObservationSink,
) -> Unsubscribe {
    let _ = sink.offset(
        element_offset(element.as_ref(), config.horizontal, config.is_rtl),
        false,
    );
    noop()
}
