//! Utilities for formatting errors in log output.

use std::fmt::Debug;

/// Format an error so it can be appended to a log message, e.g.
///
/// ```text
/// warn!("Maintenance failed.{}", log_error(&e));
/// ```
pub fn log_error(e: &impl Debug) -> String {
    format!("\n  Error: {e:?}")
}

/// Turn a caught panic payload into a message. Panics carry either a `&str` or a `String`.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}
