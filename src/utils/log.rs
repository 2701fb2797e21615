//! Logging helpers.

/**
Log at a [`tracing::Level`] chosen at runtime, `tracing`'s own macros need the level to be a
constant.

Refs: <https://github.com/tokio-rs/tracing/issues/2730#issuecomment-1943022805>
*/
#[macro_export]
macro_rules! log {
    ($lvl:expr, $($arg:tt)+) => {
        match $lvl {
            ::tracing::Level::TRACE => ::tracing::trace!($($arg)+),
            ::tracing::Level::DEBUG => ::tracing::debug!($($arg)+),
            ::tracing::Level::INFO => ::tracing::info!($($arg)+),
            ::tracing::Level::WARN => ::tracing::warn!($($arg)+),
            ::tracing::Level::ERROR => ::tracing::error!($($arg)+),
        }
    };
}
