use std::cell::RefCell;
use std::rc::Rc;

use crate::demand::{Demand, Field, Fields, Usage, use_demand_structure};
use crate::effects_ext::use_unmount;
use crate::error::DemandError;
use crate::runtime::{Invalidator, current_invalidator, remember};
use crate::signal::{Signal, SubId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaskStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Alias of each status flag, in positional order.
pub const STATUS_FIELDS: [(&str, TaskStatus); 4] = [
    ("is_idle", TaskStatus::Idle),
    ("is_pending", TaskStatus::Pending),
    ("is_success", TaskStatus::Success),
    ("is_error", TaskStatus::Error),
];

type Subscription = Rc<RefCell<Option<(Signal<TaskStatus>, SubId)>>>;

/// Status flags of `status` as a demand structure of four `bool`s.
///
/// The calling instance is only re-rendered on status writes once one of the
/// flags has been read; an instance that never looks at its flags never
/// subscribes. Pass the same signal on every render.
pub fn use_task_status(
    status: &Signal<TaskStatus>,
) -> Result<(Demand<bool>, Usage), DemandError> {
    let subscription: Subscription = remember(|| RefCell::new(None));
    {
        let subscription = subscription.clone();
        use_unmount(move || {
            let sub = subscription.borrow_mut().take();
            if let Some((signal, id)) = sub {
                signal.unsubscribe(id);
            }
        });
    }

    let invalidator = current_invalidator();
    let fields = STATUS_FIELDS.map(|(alias, want)| {
        Field::aliased(alias, flag(status, &subscription, &invalidator, want))
    });

    use_demand_structure(Fields::list(fields))
}

fn flag(
    status: &Signal<TaskStatus>,
    subscription: &Subscription,
    invalidator: &Invalidator,
    want: TaskStatus,
) -> impl Fn(bool) -> bool + 'static {
    let status = status.clone();
    let subscription = subscription.clone();
    let invalidator = invalidator.clone();
    move |initial| {
        // A handle read after unmount must not subscribe again.
        if initial && invalidator.is_live() && subscription.borrow().is_none() {
            let invalidator = invalidator.clone();
            let id = status.subscribe(move |_| invalidator.invalidate());
            *subscription.borrow_mut() = Some((status.clone(), id));
            log::debug!("status: first flag read, subscribed to status writes");
        }
        status.with(|s| *s == want)
    }
}
