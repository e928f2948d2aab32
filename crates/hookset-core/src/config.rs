//! # Hook configuration
//!
//! Behaviour switches for the hooks in this crate are held in a thread‑local
//! stack of frames, the same way composition locals are:
//!
//! ```rust
//! use hookset_core::*;
//!
//! let lenient = HooksConfig {
//!     reject_duplicate_aliases: false,
//!     ..HooksConfig::default()
//! };
//!
//! with_hooks_config(lenient, || {
//!     // demand structures built here keep the first of two equal aliases
//!     assert!(!hooks_config().reject_duplicate_aliases);
//! });
//! assert!(hooks_config().reject_duplicate_aliases);
//! ```

use std::cell::RefCell;

thread_local! {
    static CONFIG_STACK: RefCell<Vec<HooksConfig>> = const { RefCell::new(Vec::new()) };
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HooksConfig {
    /// Fail demand structure construction on duplicate or empty aliases.
    /// When off, the first occurrence of an alias wins and a warning is logged.
    pub reject_duplicate_aliases: bool,
    /// Emit `log::trace!` for every demand read.
    pub trace_reads: bool,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            reject_duplicate_aliases: true,
            trace_reads: cfg!(feature = "trace-reads"),
        }
    }
}

/// Runs `f` with `config` installed, restoring the outer frame afterwards (also on unwind).
pub fn with_hooks_config<R>(config: HooksConfig, f: impl FnOnce() -> R) -> R {
    struct Guard;
    impl Drop for Guard {
        fn drop(&mut self) {
            CONFIG_STACK.with(|st| {
                st.borrow_mut().pop();
            });
        }
    }
    CONFIG_STACK.with(|st| st.borrow_mut().push(config));
    let _guard = Guard;
    f()
}

pub fn hooks_config() -> HooksConfig {
    CONFIG_STACK.with(|st| st.borrow().last().copied().unwrap_or_default())
}
