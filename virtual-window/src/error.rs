use alloc::string::String;

use thiserror::Error;

/// Failure to map a rendered element back to its item index.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IndexAttributeError {
    #[error("missing attribute `{attribute}` on measured element")]
    Missing { attribute: String },

    #[error("attribute `{attribute}` is not an item index: {value:?}")]
    Invalid { attribute: String, value: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("`lanes` must be at least 1")]
    ZeroLanes,
}

/// Unwraps a value the engine's own bookkeeping guarantees to exist.
///
/// Absence is a broken internal contract, not a runtime condition, so this panics.
#[track_caller]
pub(crate) fn expect_present<T>(value: Option<T>, what: &str) -> T {
    match value {
        Some(v) => v,
        None => panic!("virtual-window: expected {what} to be present"),
    }
}
