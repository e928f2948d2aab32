//! # Instances, Identity, and Demand
//!
//! Hookset is a small set of hook primitives on top of a slot-based component
//! runtime. There are three main pieces:
//!
//! - `Instance` / `remember*` / `memo`: lifecycle‑aware storage bound to a
//!   component instance.
//! - `DepsTracker` / `use_deps*`: a change counter that gated hooks key on.
//! - `Demand` / `use_demand_structure`: fields computed on every read, with
//!   a record of which fields were ever read.
//!
//! ## Instances
//!
//! Hooks resolve their storage against the instance that is currently
//! rendering. The Nth slot-based call in a render always refers to the Nth
//! stored value:
//!
//! ```rust
//! use hookset_core::*;
//!
//! let inst = Instance::new();
//! for _ in 0..3 {
//!     inst.render(|| {
//!         let renders = remember_state(|| 0);
//!         *renders.borrow_mut() += 1;
//!     });
//! }
//! let count = inst.render(|| *remember_state(|| 0).borrow());
//! assert_eq!(count, 3);
//! ```
//!
//! ## Gated hooks
//!
//! `use_deps_memo`, `use_deps_effect` and `use_deps_callback` re-run only when
//! the identity of their input advances:
//!
//! ```rust
//! use hookset_core::*;
//!
//! let inst = Instance::new();
//! let a = inst.render(|| use_deps_memo(DepsInput::List(&[1, 2]), || "first"));
//! let b = inst.render(|| use_deps_memo(DepsInput::List(&[1, 2]), || "second"));
//! assert_eq!(*b, "first");
//! assert!(std::rc::Rc::ptr_eq(&a, &b));
//! ```
//!
//! ## Demand structures
//!
//! `use_demand_structure` hands out one structure per instance call site. Its
//! fields read through the producers of the latest render, and its `Usage`
//! set says which fields a caller has looked at:
//!
//! ```rust
//! use hookset_core::*;
//!
//! let inst = Instance::new();
//! let (flags, usage) = inst.render(|| {
//!     use_demand_structure(Fields::list([
//!         Field::aliased("isPending", |_| false),
//!         Field::aliased("isDone", |_| true),
//!     ]))
//!     .unwrap()
//! });
//! assert!(usage.is_empty());
//! assert_eq!(flags.get_by_alias("isDone"), Some(true));
//! assert!(usage.is_index_used(1));
//! ```
//!
//! Disposing an instance runs every cleanup its hooks registered.

pub mod config;
pub mod demand;
pub mod deps;
pub mod effects;
pub mod effects_ext;
pub mod error;
pub mod prelude;
pub mod runtime;
pub mod scope;
pub mod signal;
pub mod status;

pub use config::*;
pub use demand::*;
pub use deps::*;
pub use effects::*;
pub use effects_ext::*;
pub use error::*;
pub use prelude::*;
pub use runtime::*;
pub use scope::*;
pub use signal::*;
pub use status::*;
