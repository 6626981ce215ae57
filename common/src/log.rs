//! Output macros shared by every crate in the workspace.
//!
//! Each macro emits a `tracing` event under a `sweepr::*` target, which the
//! CLI formatter turns into a status symbol (`[+]`, `[*]`, `[!]`, `[-]`).

pub const SUCCESS_TARGET: &str = "sweepr::success";
pub const INFO_TARGET: &str = "sweepr::info";
pub const WARN_TARGET: &str = "sweepr::warn";
pub const ERROR_TARGET: &str = "sweepr::error";
pub const PRINT_TARGET: &str = "sweepr::print";

#[macro_export]
macro_rules! success {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::log::SUCCESS_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::log::INFO_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!(target: $crate::log::WARN_TARGET, $($arg)*)
    };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::tracing::error!(target: $crate::log::ERROR_TARGET, $($arg)*)
    };
}
