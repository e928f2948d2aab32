use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::scope::Scope;

thread_local! {
    static CURRENT_INSTANCE: RefCell<Option<Weak<InstanceInner>>> = const { RefCell::new(None) };
}

/// Slot storage for one component instance.
#[derive(Default)]
pub struct Composer {
    pub slots: Vec<Box<dyn Any>>,
    pub cursor: usize,
    pub keyed_slots: HashMap<String, Box<dyn Any>>,
}

struct InstanceInner {
    composer: RefCell<Composer>,
    scope: Scope,
    invalidated: Rc<Cell<bool>>,
    renders: Cell<u64>,
}

/// A component instance: owns remembered slots, a disposal scope, and an
/// invalidation flag that hooks raise to ask for another render.
pub struct Instance {
    inner: Rc<InstanceInner>,
}

impl Default for Instance {
    fn default() -> Self {
        Self::new()
    }
}

impl Instance {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(InstanceInner {
                composer: RefCell::new(Composer::default()),
                scope: Scope::new(),
                invalidated: Rc::new(Cell::new(false)),
                renders: Cell::new(0),
            }),
        }
    }

    /// Runs one render pass of this instance.
    ///
    /// Hooks called inside `f` resolve their slots against this instance,
    /// in call order. Effects register their cleanups in the instance scope.
    pub fn render<R>(&self, f: impl FnOnce() -> R) -> R {
        self.inner.composer.borrow_mut().cursor = 0;
        self.inner.renders.set(self.inner.renders.get() + 1);

        let prev =
            CURRENT_INSTANCE.with(|cur| cur.borrow_mut().replace(Rc::downgrade(&self.inner)));
        let _restore = RestoreCurrent(prev);

        self.inner.scope.run(f)
    }

    pub fn scope(&self) -> &Scope {
        &self.inner.scope
    }

    pub fn render_count(&self) -> u64 {
        self.inner.renders.get()
    }

    /// Returns whether a render was requested since the last call, clearing the flag.
    pub fn take_invalidated(&self) -> bool {
        self.inner.invalidated.replace(false)
    }

    pub fn invalidator(&self) -> Invalidator {
        Invalidator(Rc::downgrade(&self.inner.invalidated))
    }

    /// Tears the instance down: runs scope disposers, then drops every slot.
    pub fn dispose(self) {
        self.inner.scope.clone().dispose();
        let mut c = self.inner.composer.borrow_mut();
        c.slots.clear();
        c.keyed_slots.clear();
        c.cursor = 0;
    }
}

struct RestoreCurrent(Option<Weak<InstanceInner>>);

impl Drop for RestoreCurrent {
    fn drop(&mut self) {
        let prev = self.0.take();
        CURRENT_INSTANCE.with(|cur| *cur.borrow_mut() = prev);
    }
}

fn current_instance() -> Option<Rc<InstanceInner>> {
    CURRENT_INSTANCE.with(|cur| cur.borrow().as_ref().and_then(Weak::upgrade))
}

/// Handle that marks its instance as needing another render.
///
/// Holding one does not keep the instance alive.
#[derive(Clone, Default)]
pub struct Invalidator(Weak<Cell<bool>>);

impl Invalidator {
    pub fn invalidate(&self) {
        if let Some(flag) = self.0.upgrade() {
            flag.set(true);
        }
    }

    pub fn is_live(&self) -> bool {
        self.0.strong_count() > 0
    }
}

/// Invalidator for the instance currently rendering (a dead handle outside a render).
pub fn current_invalidator() -> Invalidator {
    current_instance()
        .map(|inst| Invalidator(Rc::downgrade(&inst.invalidated)))
        .unwrap_or_default()
}

/// Requests another render of the instance currently rendering.
pub fn request_render() {
    current_invalidator().invalidate();
}

/// Slot-based remember (sequential composition only). `init` must not call other hooks.
pub fn remember<T: 'static>(init: impl FnOnce() -> T) -> Rc<T> {
    let Some(inst) = current_instance() else {
        log::warn!("remember called outside of Instance::render; value will not persist");
        return Rc::new(init());
    };

    let mut c = inst.composer.borrow_mut();
    let cursor = c.cursor;
    c.cursor += 1;

    if cursor >= c.slots.len() {
        let rc: Rc<T> = Rc::new(init());
        c.slots.push(Box::new(rc.clone()));
        return rc;
    }

    if let Some(rc) = c.slots[cursor].downcast_ref::<Rc<T>>() {
        rc.clone()
    } else {
        log::warn!(
            "remember: slot {} type changed; replacing. \
             If this is due to conditional hook calls, prefer remember_with_key.",
            cursor
        );
        let rc: Rc<T> = Rc::new(init());
        c.slots[cursor] = Box::new(rc.clone());
        rc
    }
}

/// Key-based remember
pub fn remember_with_key<T: 'static>(key: impl Into<String>, init: impl FnOnce() -> T) -> Rc<T> {
    let key = key.into();
    let Some(inst) = current_instance() else {
        log::warn!("remember_with_key('{key}') called outside of Instance::render");
        return Rc::new(init());
    };

    let mut c = inst.composer.borrow_mut();
    if let Some(existing) = c.keyed_slots.get(&key) {
        if let Some(rc) = existing.downcast_ref::<Rc<T>>() {
            return rc.clone();
        }
        log::warn!(
            "remember_with_key: key '{}' reused with a different type; replacing.",
            key
        );
    }

    let rc: Rc<T> = Rc::new(init());
    c.keyed_slots.insert(key, Box::new(rc.clone()));
    rc
}

pub fn remember_state<T: 'static>(init: impl FnOnce() -> T) -> Rc<RefCell<T>> {
    remember(|| RefCell::new(init()))
}

pub fn remember_state_with_key<T: 'static>(
    key: impl Into<String>,
    init: impl FnOnce() -> T,
) -> Rc<RefCell<T>> {
    remember_with_key(key, || RefCell::new(init()))
}

struct Memo<K, T> {
    key: K,
    value: Rc<T>,
}

/// Computes `init` once and returns the same `Rc` on later renders until `key`
/// stops comparing equal to the key it was computed with.
///
/// `init` must not call slot-based hooks: they would only take slots on the
/// renders where it runs.
pub fn memo<K, T>(key: K, init: impl FnOnce() -> T) -> Rc<T>
where
    K: PartialEq + 'static,
    T: 'static,
{
    let cell = remember(|| RefCell::new(None::<Memo<K, T>>));

    if let Some(m) = cell.borrow().as_ref()
        && m.key == key
    {
        return m.value.clone();
    }

    let value = Rc::new(init());
    *cell.borrow_mut() = Some(Memo {
        key,
        value: value.clone(),
    });
    value
}
