//! Host-side wiring for the `virtual-window` crate.
//!
//! The `virtual-window` crate is UI-agnostic and focuses on the core math and state. This crate
//! connects it to a scroll container:
//!
//! - Attachment to a [`ScrollElement`] obtained from `get_scroll_element`
//! - Rect/offset observer subscriptions delivering into an [`ObservationSink`]
//! - The default element scroll executor ([`element_scroll`]), right-to-left aware
//! - A [`Controller`] pumping queued observations and the engine clock
//!
//! This crate is framework-agnostic (no DOM or toolkit bindings).
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod controller;
mod element;
mod observe;


pub use controller::{AdapterOptions, Controller, GetScrollElementFn};
pub use element::{
    ScrollElement, element_offset, element_scroll, logical_offset, native_position,
};
pub use observe::{
    ObserveConfig, ObserveOffsetFn, ObserveRectFn, Observation, ObservationSink, SinkClosed,
    Unsubscribe, observe_offset_once, observe_rect_once,
};
