pub use crate::config::{HooksConfig, hooks_config, with_hooks_config};
pub use crate::demand::{
    Demand, Field, Fields, LiveFields, Producer, Slot, Usage, producer, use_demand_structure,
    use_demand_structure_keyed,
};
pub use crate::deps::{
    DepId, DepsInput, DepsTracker, use_deps, use_deps_compare, use_deps_list, use_deps_predicate,
};
pub use crate::effects::{Dispose, effect, on_unmount};
pub use crate::effects_ext::{
    disposable_effect, side_effect, use_deps_callback, use_deps_effect, use_deps_memo, use_unmount,
};
pub use crate::error::DemandError;
pub use crate::runtime::{
    Instance, Invalidator, current_invalidator, memo, remember, remember_state,
    remember_state_with_key, remember_with_key, request_render,
};
pub use crate::scope::{Scope, current_scope, scoped_effect};
pub use crate::signal::{Signal, signal};
pub use crate::status::{TaskStatus, use_task_status};
