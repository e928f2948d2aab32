//! # Demand structures
//!
//! A demand structure exposes a fixed set of fields whose values are computed
//! on every read. Each field is backed by a [`Producer`], a closure taking one
//! `bool`: `true` on the very first read of that field, `false` afterwards.
//!
//! Fields come in two layouts:
//!
//! - **list**: fields are addressed by position, and a field declared with
//!   [`Field::aliased`] is also addressed by its alias. Both addresses are the
//!   same field: reading either one marks both as used.
//! - **map**: fields are addressed by key only.
//!
//! ```rust
//! use hookset_core::*;
//!
//! let live = LiveFields::new(Fields::list([
//!     Field::aliased("isPending", |_| false),
//!     Field::aliased("isDone", |_| true),
//! ]));
//! let (status, usage) = Demand::build(live).unwrap();
//!
//! assert_eq!(status.get(0), Some(false));
//! assert_eq!(status.get_by_alias("isDone"), Some(true));
//! assert!(usage.is_alias_used("isPending"));
//! assert!(usage.is_index_used(1));
//! ```
//!
//! Nothing is cached: two reads run the producer twice. The usage set is the
//! signal callers branch on to opt into expensive reactivity only once a field
//! has actually been looked at. It is returned next to the structure, never
//! as part of its enumerable keys.
//!
//! Inside a component, [`use_demand_structure`] keeps the structure identity
//! stable across renders while swapping in each render's producers.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use indexmap::{Equivalent, IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::config::hooks_config;
use crate::error::DemandError;
use crate::runtime::{remember, remember_state};

/// Computes a field value. The argument is `true` only on the first read of the field.
pub type Producer<V> = Rc<dyn Fn(bool) -> V>;

pub fn producer<V>(f: impl Fn(bool) -> V + 'static) -> Producer<V> {
    Rc::new(f)
}

/// One entry of a list-form field set.
pub enum Field<V> {
    Positional(Producer<V>),
    Aliased {
        alias: Rc<str>,
        accessor: Producer<V>,
    },
}

impl<V> Field<V> {
    pub fn positional(f: impl Fn(bool) -> V + 'static) -> Self {
        Field::Positional(Rc::new(f))
    }

    pub fn aliased(alias: impl Into<Rc<str>>, f: impl Fn(bool) -> V + 'static) -> Self {
        Field::Aliased {
            alias: alias.into(),
            accessor: Rc::new(f),
        }
    }

    fn producer(&self) -> &Producer<V> {
        match self {
            Field::Positional(p) => p,
            Field::Aliased { accessor, .. } => accessor,
        }
    }
}

pub enum Fields<V> {
    List(Vec<Field<V>>),
    Map(Vec<(Rc<str>, Producer<V>)>),
}

impl<V> Fields<V> {
    pub fn list(fields: impl IntoIterator<Item = Field<V>>) -> Self {
        Fields::List(fields.into_iter().collect())
    }

    /// Key order is kept for enumeration.
    pub fn map<K: Into<Rc<str>>>(entries: impl IntoIterator<Item = (K, Producer<V>)>) -> Self {
        Fields::Map(entries.into_iter().map(|(k, p)| (k.into(), p)).collect())
    }

    fn kind(&self) -> FieldsKind {
        match self {
            Fields::List(_) => FieldsKind::List,
            Fields::Map(_) => FieldsKind::Map,
        }
    }
}

/// Swappable cell holding the producers of the latest render.
///
/// A [`Demand`] reads through this cell on every access, so replacing its
/// contents changes behaviour without changing structure identity.
pub struct LiveFields<V>(Rc<RefCell<Fields<V>>>);

impl<V> Clone for LiveFields<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<V> LiveFields<V> {
    pub fn new(fields: Fields<V>) -> Self {
        Self(Rc::new(RefCell::new(fields)))
    }

    pub fn replace(&self, fields: Fields<V>) {
        *self.0.borrow_mut() = fields;
    }

    fn list_producer(&self, position: usize) -> Option<Producer<V>> {
        match &*self.0.borrow() {
            Fields::List(list) => list.get(position).map(|f| f.producer().clone()),
            Fields::Map(_) => None,
        }
    }

    fn map_producer(&self, key: &str) -> Option<Producer<V>> {
        match &*self.0.borrow() {
            Fields::Map(entries) => entries
                .iter()
                .find(|(k, _)| &**k == key)
                .map(|(_, p)| p.clone()),
            Fields::List(_) => None,
        }
    }
}

/// Address of one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Slot {
    Index(usize),
    Alias(Rc<str>),
}

// Hashed the same way as `SlotRef` so a borrowed alias can look up a `Slot`.
impl Hash for Slot {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Slot::Index(i) => SlotRef::Index(*i).hash(state),
            Slot::Alias(a) => SlotRef::Alias(a).hash(state),
        }
    }
}

/// Borrowed form of [`Slot`] for set lookups.
#[derive(Hash)]
enum SlotRef<'a> {
    Index(usize),
    Alias(&'a str),
}

impl Equivalent<Slot> for SlotRef<'_> {
    fn equivalent(&self, key: &Slot) -> bool {
        match (self, key) {
            (SlotRef::Index(a), Slot::Index(b)) => a == b,
            (SlotRef::Alias(a), Slot::Alias(b)) => *a == &**b,
            _ => false,
        }
    }
}

impl From<usize> for Slot {
    fn from(i: usize) -> Self {
        Slot::Index(i)
    }
}

impl From<&str> for Slot {
    fn from(alias: &str) -> Self {
        Slot::Alias(alias.into())
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Index(i) => write!(f, "{i}"),
            Slot::Alias(a) => f.write_str(a),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldsKind {
    List,
    Map,
}

/// Shape of a demand structure, fixed at construction.
#[derive(Clone, Debug)]
pub struct Layout {
    kind: FieldsKind,
    /// Alias declared at each list position.
    positions: SmallVec<[Option<Rc<str>>; 8]>,
    /// Alias or key -> list position or map entry index, in declaration order.
    aliases: IndexMap<Rc<str>, usize>,
}

impl Layout {
    pub fn kind(&self) -> FieldsKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty() && self.aliases.is_empty()
    }

    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

/// Checks one alias against those already declared. `Ok(false)` means skip it.
fn admit_alias(
    aliases: &IndexMap<Rc<str>, usize>,
    alias: &Rc<str>,
    position: usize,
) -> Result<bool, DemandError> {
    let strict = hooks_config().reject_duplicate_aliases;

    if alias.is_empty() {
        if strict {
            return Err(DemandError::EmptyAlias { position });
        }
        log::warn!("demand: empty alias at position {position} ignored");
        return Ok(false);
    }

    if let Some(&first) = aliases.get(alias) {
        if strict {
            return Err(DemandError::DuplicateAlias {
                alias: alias.to_string(),
                first,
                second: position,
            });
        }
        log::warn!(
            "demand: alias '{alias}' at position {position} shadows position {first}; keeping the first"
        );
        return Ok(false);
    }

    Ok(true)
}

/// Layout for list-form fields: every position, plus each admitted alias.
pub fn list_layout<V>(fields: &[Field<V>]) -> Result<Layout, DemandError> {
    let mut positions = SmallVec::with_capacity(fields.len());
    let mut aliases = IndexMap::new();

    for (i, field) in fields.iter().enumerate() {
        let alias = match field {
            Field::Positional(_) => None,
            Field::Aliased { alias, .. } => {
                admit_alias(&aliases, alias, i)?.then(|| alias.clone())
            }
        };
        if let Some(a) = &alias {
            aliases.insert(a.clone(), i);
        }
        positions.push(alias);
    }

    Ok(Layout {
        kind: FieldsKind::List,
        positions,
        aliases,
    })
}

/// Layout for map-form fields: keys only, no positions.
pub fn map_layout<V>(entries: &[(Rc<str>, Producer<V>)]) -> Result<Layout, DemandError> {
    let mut aliases = IndexMap::new();
    for (i, (key, _)) in entries.iter().enumerate() {
        if admit_alias(&aliases, key, i)? {
            aliases.insert(key.clone(), i);
        }
    }

    Ok(Layout {
        kind: FieldsKind::Map,
        positions: SmallVec::new(),
        aliases,
    })
}

/// Slots that have been read at least once, in first-read order.
#[derive(Clone, Default)]
pub struct Usage(Rc<RefCell<IndexSet<Slot>>>);

impl Usage {
    pub fn is_used(&self, slot: &Slot) -> bool {
        self.0.borrow().contains(slot)
    }

    pub fn is_index_used(&self, index: usize) -> bool {
        self.is_used(&Slot::Index(index))
    }

    pub fn is_alias_used(&self, alias: &str) -> bool {
        self.0.borrow().contains(&SlotRef::Alias(alias))
    }

    pub fn slots(&self) -> Vec<Slot> {
        self.0.borrow().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    fn mark(&self, slot: Slot) {
        self.0.borrow_mut().insert(slot);
    }
}

impl fmt::Debug for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.0.borrow().iter().map(|s| s.to_string()))
            .finish()
    }
}

struct DemandInner<V> {
    layout: Layout,
    live: LiveFields<V>,
    usage: Usage,
}

/// Demand-evaluated field structure. Clones share identity and usage.
pub struct Demand<V>(Rc<DemandInner<V>>);

impl<V> Clone for Demand<V> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<V> Demand<V> {
    /// Builds a structure over `live`, shaped by the fields it holds right now.
    pub fn build(live: LiveFields<V>) -> Result<(Self, Usage), DemandError> {
        let layout = match &*live.0.borrow() {
            Fields::List(fields) => list_layout(fields)?,
            Fields::Map(entries) => map_layout(entries)?,
        };
        log::debug!(
            "demand: built {:?} structure with {} positions and {} aliases",
            layout.kind,
            layout.len(),
            layout.alias_count()
        );

        let usage = Usage::default();
        let demand = Self(Rc::new(DemandInner {
            layout,
            live,
            usage: usage.clone(),
        }));
        Ok((demand, usage))
    }

    pub fn layout(&self) -> &Layout {
        &self.0.layout
    }

    /// Positional length; zero for map-form structures.
    pub fn len(&self) -> usize {
        self.0.layout.len()
    }

    /// True when the structure has no address at all, positional or aliased.
    pub fn is_empty(&self) -> bool {
        self.0.layout.is_empty()
    }

    /// Reads the field at `index`. `None` if no such position was declared.
    pub fn get(&self, index: usize) -> Option<V> {
        let alias = self.0.layout.positions.get(index)?.clone();
        self.read_position(index, alias)
    }

    /// Reads the field declared with `alias` (list form) or keyed `alias` (map form).
    pub fn get_by_alias(&self, alias: &str) -> Option<V> {
        let (key, &at) = self.0.layout.aliases.get_key_value(alias)?;
        match self.0.layout.kind {
            FieldsKind::List => self.read_position(at, Some(key.clone())),
            FieldsKind::Map => self.read_key(key.clone()),
        }
    }

    pub fn get_slot(&self, slot: &Slot) -> Option<V> {
        match slot {
            Slot::Index(i) => self.get(*i),
            Slot::Alias(a) => self.get_by_alias(a),
        }
    }

    /// Every address: positions in order, then aliases in declaration order.
    pub fn keys(&self) -> Vec<Slot> {
        let layout = &self.0.layout;
        (0..layout.len())
            .map(Slot::Index)
            .chain(layout.aliases.keys().cloned().map(Slot::Alias))
            .collect()
    }

    /// Fresh reads of positions `0..len`, in order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            demand: self,
            next: 0,
        }
    }

    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    fn read_position(&self, position: usize, alias: Option<Rc<str>>) -> Option<V> {
        let Some(p) = self.0.live.list_producer(position) else {
            log::warn!("demand: position {position} has no producer in the current field list");
            return None;
        };

        let usage = &self.0.usage;
        let initial = !usage.is_index_used(position);
        usage.mark(Slot::Index(position));
        if let Some(alias) = alias {
            usage.mark(Slot::Alias(alias));
        }
        self.trace(&Slot::Index(position), initial);

        Some(p(initial))
    }

    fn read_key(&self, key: Rc<str>) -> Option<V> {
        let Some(p) = self.0.live.map_producer(&key) else {
            log::warn!("demand: key '{key}' has no producer in the current field map");
            return None;
        };

        let slot = Slot::Alias(key);
        let usage = &self.0.usage;
        let initial = !usage.is_used(&slot);
        self.trace(&slot, initial);
        usage.mark(slot);

        Some(p(initial))
    }

    fn trace(&self, slot: &Slot, initial: bool) {
        if hooks_config().trace_reads {
            log::trace!("demand: read {slot} (initial: {initial})");
        }
    }
}

impl<V> fmt::Debug for Demand<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Demand")
            .field("kind", &self.0.layout.kind)
            .field("len", &self.0.layout.len())
            .field("aliases", &self.0.layout.aliases.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct Iter<'a, V> {
    demand: &'a Demand<V>,
    next: usize,
}

impl<V> Iterator for Iter<'_, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        if self.next >= self.demand.len() {
            return None;
        }
        let v = self.demand.get(self.next);
        // A missing producer ends iteration; later positions are missing too.
        self.next = if v.is_some() {
            self.next + 1
        } else {
            self.demand.len()
        };
        v
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.demand.len() - self.next))
    }
}

impl<'a, V> IntoIterator for &'a Demand<V> {
    type Item = V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

/// Demand structure that keeps its identity for the lifetime of the calling
/// instance while reading this render's `fields`.
pub fn use_demand_structure<V: 'static>(
    fields: Fields<V>,
) -> Result<(Demand<V>, Usage), DemandError> {
    use_demand_structure_keyed((), fields)
}

/// Like [`use_demand_structure`], but rebuilt (with fresh usage) whenever `key`
/// stops comparing equal to the key of the previous build.
pub fn use_demand_structure_keyed<K, V>(
    key: K,
    fields: Fields<V>,
) -> Result<(Demand<V>, Usage), DemandError>
where
    K: PartialEq + 'static,
    V: 'static,
{
    let live = remember(|| LiveFields::new(Fields::List(Vec::new())));
    let built = remember_state(|| None::<(K, Demand<V>, Usage)>);

    let current = built
        .borrow()
        .as_ref()
        .filter(|(k, _, _)| *k == key)
        .map(|(_, d, u)| (d.clone(), u.clone()));

    if let Some((demand, usage)) = current {
        // The layout cannot read the other form, so its producers stay live.
        if demand.0.layout.kind == fields.kind() {
            live.replace(fields);
        } else {
            log::warn!(
                "demand: field set changed to {:?} form; keeping the {:?} producers until the key changes",
                fields.kind(),
                demand.0.layout.kind
            );
        }
        return Ok((demand, usage));
    }

    live.replace(fields);

    let (demand, usage) = Demand::build((*live).clone())?;
    *built.borrow_mut() = Some((key, demand.clone(), usage.clone()));
    Ok((demand, usage))
}
