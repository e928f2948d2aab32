use crate::deps::{DepId, DepsInput, use_deps};
use crate::{Dispose, memo, on_unmount, remember, scoped_effect};
use std::cell::RefCell;
use std::rc::Rc;

/// cleanup on key change or unmount
pub fn disposable_effect<K: PartialEq + Clone + 'static>(
    key: K,
    effect: impl FnOnce() -> Dispose + 'static,
) {
    let last_key = remember(|| RefCell::new(None::<K>));
    let cleanup_slot = remember(|| RefCell::new(None::<Dispose>));
    let installed = remember(|| RefCell::new(false));

    // Install a single unmount disposer for this call site.
    if !*installed.borrow() {
        *installed.borrow_mut() = true;
        let cleanup_slot = cleanup_slot.clone();
        scoped_effect(move || {
            Box::new(move || {
                let d = cleanup_slot.borrow_mut().take();
                if let Some(d) = d {
                    d.run();
                }
            })
        });
    }

    // Key change: cleanup previous + run new effect
    let changed = last_key.borrow().as_ref() != Some(&key);
    if changed {
        *last_key.borrow_mut() = Some(key);

        let prev = cleanup_slot.borrow_mut().take();
        if let Some(d) = prev {
            d.run();
        }

        let d = effect();
        *cleanup_slot.borrow_mut() = Some(d);
    }
}

/// runs on every render
pub fn side_effect(effect: impl Fn()) {
    effect();
}

/// Effect re-run (after its previous cleanup) whenever the identity of `input` advances.
pub fn use_deps_effect<T>(input: DepsInput<'_, T>, effect: impl FnOnce() -> Dispose + 'static)
where
    T: PartialEq + Clone + 'static,
{
    let id = use_deps(input);
    disposable_effect(id, effect);
}

/// Value recomputed only when the identity of `input` advances.
pub fn use_deps_memo<T, R>(input: DepsInput<'_, T>, compute: impl FnOnce() -> R) -> Rc<R>
where
    T: PartialEq + Clone + 'static,
    R: 'static,
{
    let id = use_deps(input);
    memo(id, compute)
}

/// Callback whose identity only changes when the identity of `input` advances.
///
/// Callers compare the returned `Rc`s with `Rc::ptr_eq` to skip re-subscribing.
pub fn use_deps_callback<T, F>(input: DepsInput<'_, T>, f: F) -> Rc<F>
where
    T: PartialEq + Clone + 'static,
    F: 'static,
{
    let id = use_deps(input);
    memo::<DepId, F>(id, || f)
}

/// Registers `f` to run when the current instance is disposed.
pub fn use_unmount(f: impl FnOnce() + 'static) {
    let installed = remember(|| RefCell::new(false));
    if !installed.replace(true) {
        crate::effect(move || on_unmount(f));
    }
}
