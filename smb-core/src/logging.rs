//! Logging facade for the client crates.
//!
//! With the `tracing` feature the level macros are `tracing`'s own, so fields
//! and formatting follow `tracing` syntax. Without it every call expands to
//! `()` and the arguments are never evaluated.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __smb_log_trace {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __smb_log_debug {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __smb_log_info {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __smb_log_warn {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
#[macro_export]
#[doc(hidden)]
macro_rules! __smb_log_error {
    ($($t:tt)*) => {()};
}

#[cfg(not(feature = "tracing"))]
pub use crate::{
    __smb_log_debug as debug, __smb_log_error as error, __smb_log_info as info, __smb_log_trace as trace,
    __smb_log_warn as warn,
};
