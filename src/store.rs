//! The parameter store: every parameter a search request is built from, keyed by name, with a
//! fixed policy for which names may hold more than one value.
//!
//! Names keep the order they were first added in, both in [`ParameterStore::string`] and in
//! [`ParameterStore::names`]. Removing a name and adding it again moves it to the end.

use std::collections::HashSet;
use std::fmt;

use log::{debug, trace};

use crate::parameter::Parameter;
use crate::persist::{NoPersistence, Persistence};
use crate::value::{Pattern, Value};
use crate::Result;

/// The names Solr accepts more than once in a single request
pub const DEFAULT_MULTIPLE: [&str; 9] = [
    "bf",
    "bq",
    "facet.date",
    "facet.date.other",
    "facet.field",
    "facet.query",
    "fq",
    "pf",
    "qf",
];

/// Decides which parameter names may repeat
pub enum Multiplicity {
    /// Exactly the names in the set
    Names(HashSet<String>),
    /// An arbitrary predicate
    Custom(Box<dyn Fn(&str) -> bool + Send + Sync>),
}

impl Multiplicity {
    /// The repeatable names of a stock Solr request handler
    pub fn solr() -> Self {
        Self::names(DEFAULT_MULTIPLE.iter())
    }

    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Multiplicity::Names(names.into_iter().map(|n| n.as_ref().to_string()).collect())
    }

    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Multiplicity::Custom(Box::new(f))
    }

    pub fn is_multiple(&self, name: &str) -> bool {
        match self {
            Multiplicity::Names(names) => names.contains(name),
            Multiplicity::Custom(f) => f(name),
        }
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::solr()
    }
}

impl fmt::Debug for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiplicity::Names(names) => {
                let mut names: Vec<&String> = names.iter().collect();
                names.sort();
                f.debug_tuple("Names").field(&names).finish()
            }
            Multiplicity::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// What the store holds for one name, as seen from outside. A single-valued name is always a
/// [`Slot::Single`] and a repeatable name always a [`Slot::Multi`]: the shape comes from the
/// store's [`Multiplicity`], not from what was stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slot<'a> {
    Single(&'a Parameter),
    Multi(&'a [Parameter]),
}

impl<'a> Slot<'a> {
    pub fn is_multi(self) -> bool {
        matches!(self, Slot::Multi(_))
    }

    /// Every parameter in this slot, in insertion order
    pub fn parameters(self) -> &'a [Parameter] {
        match self {
            Slot::Single(p) => std::slice::from_ref(p),
            Slot::Multi(list) => list,
        }
    }

    pub fn as_single(self) -> Option<&'a Parameter> {
        match self {
            Slot::Single(p) => Some(p),
            Slot::Multi(_) => None,
        }
    }
}

/// Write access to the parameters of one name, handed out by [`ParameterStore::get`]. Values and
/// local params can be changed in place; parameters cannot be swapped out, renamed, added or
/// dropped, and a repeatable name never ends up holding the same value twice.
///
/// ```compile_fail
/// use facetstore::{Parameter, ParameterStore, Slot};
///
/// let mut store = ParameterStore::new();
/// *store.get("q") = Slot::Multi(&[Parameter::new("q")]);
/// ```
#[derive(Debug)]
pub struct SlotMut<'a> {
    params: &'a mut Vec<Parameter>,
    multi: bool,
}

impl<'a> SlotMut<'a> {
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.params[..]
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    fn taken(&self, index: usize, value: Option<&Value>) -> bool {
        self.multi && self.params.iter().enumerate().any(|(i, p)| i != index && p.val() == value)
    }

    /// Set the value of the parameter at `index`. Returns `false`, changing nothing, when there is
    /// no such parameter or a sibling already holds the value.
    pub fn set_val<V: Into<Value>>(&mut self, index: usize, value: V) -> bool {
        let value = value.into();
        if index >= self.params.len() || self.taken(index, Some(&value)) {
            return false;
        }
        self.params[index].set_val(value);
        true
    }

    /// Unset the value of the parameter at `index`, under the same rules as [`SlotMut::set_val`]
    pub fn clear_val(&mut self, index: usize) -> bool {
        if index >= self.params.len() || self.taken(index, None) {
            return false;
        }
        self.params[index].clear_val();
        true
    }

    pub fn set_local<K, V>(&mut self, index: usize, key: K, value: V) -> bool
    where
        K: Into<String>,
        V: Into<String>,
    {
        match self.params.get_mut(index) {
            Some(p) => {
                p.set_local(key, value);
                true
            }
            None => false,
        }
    }

    pub fn remove_local(&mut self, index: usize, key: &str) -> Option<String> {
        self.params.get_mut(index)?.remove_local(key)
    }
}

/// Where [`ParameterStore::find`] found a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Found {
    /// Positions inside a repeatable name, never empty
    Indices(Vec<usize>),
    /// The single-valued name that matched
    Name(String),
}

/// The full set of parameters for a search session, plus the subset of names ("exposed" names)
/// that is saved to and restored from a [`Persistence`].
///
/// ```
/// use facetstore::{ParameterStore, Value};
///
/// let mut store = ParameterStore::new();
/// store.add_by_value("q", "test");
/// store.add_by_value("fq", vec!["a:1", "a:2"]);
/// assert_eq!(store.string(), "q=test&fq=a%3A1&fq=a%3A2");
/// assert_eq!(store.values("fq"), vec![Value::from("a:1"), Value::from("a:2")]);
/// ```
#[derive(Debug)]
pub struct ParameterStore<P = NoPersistence> {
    params: Vec<(String, Vec<Parameter>)>,
    exposed: Vec<String>,
    multiple: Multiplicity,
    persistence: P,
}

impl ParameterStore<NoPersistence> {
    /// An empty store with Solr's repeatable names and nothing exposed
    pub fn new() -> Self {
        Self::with_persistence(NoPersistence)
    }

    pub fn builder() -> StoreBuilder<NoPersistence> {
        StoreBuilder::new()
    }
}

impl Default for ParameterStore<NoPersistence> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Persistence> ParameterStore<P> {
    pub fn with_persistence(persistence: P) -> Self {
        Self {
            params: Vec::new(),
            exposed: Vec::new(),
            multiple: Multiplicity::default(),
            persistence,
        }
    }

    pub fn is_multiple(&self, name: &str) -> bool {
        self.multiple.is_multiple(name)
    }

    /// The names saved and restored by [`ParameterStore::save`] and [`ParameterStore::load`]
    pub fn exposed(&self) -> &[String] {
        &self.exposed
    }

    pub fn set_exposed<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed = names.into_iter().map(Into::into).collect();
    }

    pub fn persistence(&self) -> &P {
        &self.persistence
    }

    pub fn persistence_mut(&mut self) -> &mut P {
        &mut self.persistence
    }

    /// Every name in the store, in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Drop every parameter, exposed or not
    pub fn clear(&mut self) {
        self.params.clear();
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|(n, _)| n == name)
    }

    fn view<'a>(&self, name: &str, list: &'a [Parameter]) -> Option<Slot<'a>> {
        if self.is_multiple(name) {
            Some(Slot::Multi(list))
        } else {
            list.first().map(Slot::Single)
        }
    }

    /// Look at a name without creating it
    pub fn peek(&self, name: &str) -> Option<Slot<'_>> {
        let idx = self.position(name)?;
        self.view(name, &self.params[idx].1)
    }

    /// The parameters of `name`. An unknown name gets an unset placeholder stored for it first, so
    /// the returned handle can be used to set a value in place.
    pub fn get(&mut self, name: &str) -> SlotMut<'_> {
        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                trace!("Creating placeholder for {}", name);
                self.params.push((name.to_string(), vec![Parameter::new(name)]));
                self.params.len() - 1
            }
        };
        let multi = self.is_multiple(name);
        SlotMut {
            params: &mut self.params[idx].1,
            multi,
        }
    }

    /// The set values of `name`, empty for an unknown name
    pub fn values(&self, name: &str) -> Vec<Value> {
        self.peek(name)
            .map(|slot| slot.parameters().iter().filter_map(|p| p.val().cloned()).collect())
            .unwrap_or_default()
    }

    /// Store `param` under `name`, or an unset parameter when `param` is `None`.
    ///
    /// A repeatable name gets the parameter appended unless one of its parameters already holds
    /// an equal value, in which case nothing changes and `None` comes back. Any other name has its
    /// parameter replaced.
    pub fn add(&mut self, name: &str, param: Option<Parameter>) -> Option<&Parameter> {
        let mut param = param.unwrap_or_else(|| Parameter::new(name));
        param.set_name(name);
        let multi = self.is_multiple(name);

        let idx = match self.position(name) {
            Some(idx) => idx,
            None => {
                self.params.push((name.to_string(), Vec::new()));
                self.params.len() - 1
            }
        };
        let list = &mut self.params[idx].1;
        if multi {
            if list.iter().any(|p| p.val() == param.val()) {
                debug!("Ignoring duplicate value for {}: {:?}", name, param.val());
                return None;
            }
            trace!("Appending to {}: {:?}", name, param.val());
            list.push(param);
        } else {
            trace!("Setting {}: {:?}", name, param.val());
            *list = vec![param];
        }
        list.last()
    }

    /// Build parameters from a plain value and [`ParameterStore::add`] them. A list given for a
    /// repeatable name becomes one parameter per element. The result has one flag per parameter
    /// built, `false` where it was a duplicate.
    pub fn add_by_value<V: Into<Value>>(&mut self, name: &str, value: V) -> Vec<bool> {
        match value.into() {
            Value::List(list) if self.is_multiple(name) => list
                .into_iter()
                .map(|s| self.add(name, Some(Parameter::with_value(name, s))).is_some())
                .collect(),
            value => vec![self.add(name, Some(Parameter::with_value(name, value))).is_some()],
        }
    }

    /// Without an index the whole name goes. With one, that element of a repeatable name goes, and
    /// the name with it once nothing is left. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str, index: Option<usize>) -> bool {
        let pos = match self.position(name) {
            Some(pos) => pos,
            None => return false,
        };
        let index = match index {
            Some(index) => index,
            None => {
                debug!("Removing {}", name);
                self.params.remove(pos);
                return true;
            }
        };
        if !self.is_multiple(name) || index >= self.params[pos].1.len() {
            return false;
        }
        debug!("Removing {}[{}]", name, index);
        let list = &mut self.params[pos].1;
        list.remove(index);
        if list.is_empty() {
            self.params.remove(pos);
        }
        true
    }

    /// Remove everything [`ParameterStore::find`] matches, returning what it found
    pub fn remove_by_value<T: Into<Pattern>>(&mut self, name: &str, pattern: T) -> Option<Found> {
        let found = self.find(name, pattern)?;
        match &found {
            Found::Indices(indices) => {
                for &idx in indices.iter().rev() {
                    self.remove(name, Some(idx));
                }
            }
            Found::Name(name) => {
                self.remove(name, None);
            }
        }
        Some(found)
    }

    /// Where `name` holds a value matching `pattern`: the matching positions for a repeatable
    /// name, the name itself for a single-valued one, `None` when nothing matches
    pub fn find<T: Into<Pattern>>(&self, name: &str, pattern: T) -> Option<Found> {
        let pattern: Pattern = pattern.into();
        let matches = |p: &Parameter| p.val().map_or(false, |v| pattern.matches(v));
        match self.peek(name)? {
            Slot::Multi(list) => {
                let indices: Vec<usize> = list
                    .iter()
                    .enumerate()
                    .filter(|(_, p)| matches(*p))
                    .map(|(idx, _)| idx)
                    .collect();
                if indices.is_empty() {
                    None
                } else {
                    Some(Found::Indices(indices))
                }
            }
            Slot::Single(p) if matches(p) => Some(Found::Name(name.to_string())),
            Slot::Single(_) => None,
        }
    }

    fn join<'a, I>(lists: I) -> String
    where
        I: Iterator<Item = &'a Vec<Parameter>>,
    {
        lists
            .flatten()
            .map(Parameter::string)
            .filter(|s| !s.is_empty())
            .collect::<Vec<String>>()
            .join("&")
    }

    /// The whole store as a query string
    pub fn string(&self) -> String {
        Self::join(self.params.iter().map(|(_, list)| list))
    }

    /// Add every `name=value` token of `query`. Tokens go through [`ParameterStore::add`], so a
    /// repeated value of a repeatable name is only kept once.
    pub fn parse_string(&mut self, query: &str) {
        trace!("Parsing {}", query);
        for token in query.split('&').filter(|t| !t.is_empty()) {
            let param = Parameter::parse(token);
            let name = param.name().to_string();
            self.add(&name, Some(param));
        }
    }

    /// Like [`ParameterStore::string`] but only for the exposed names, in exposed order
    pub fn exposed_string(&self) -> String {
        Self::join(
            self.exposed
                .iter()
                .filter_map(|name| self.position(name))
                .map(|idx| &self.params[idx].1),
        )
    }

    /// Remove every exposed name
    pub fn exposed_reset(&mut self) {
        let exposed = &self.exposed;
        self.params.retain(|(name, _)| !exposed.contains(name));
    }

    /// Hand [`ParameterStore::exposed_string`] to the persistence layer
    pub fn save(&mut self) -> Result<()> {
        let state = self.exposed_string();
        debug!("Saving exposed state: {}", state);
        self.persistence.save(&state)
    }

    pub fn stored_string(&self) -> Result<String> {
        self.persistence.stored_string()
    }

    /// Replace the exposed names with the last saved state. Without `reset`, stored values are
    /// added on top of whatever the exposed names hold now.
    pub fn load(&mut self, reset: bool) -> Result<()> {
        let stored = self.stored_string()?;
        debug!("Loading stored state: {}", stored);
        if reset {
            self.exposed_reset();
        }
        self.parse_string(&stored);
        Ok(())
    }
}

impl<P: Persistence> fmt::Display for ParameterStore<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string())
    }
}

/// Assembles a [`ParameterStore`]
#[derive(Debug)]
pub struct StoreBuilder<P> {
    exposed: Vec<String>,
    multiple: Multiplicity,
    persistence: P,
    params: Vec<(String, Value)>,
}

impl StoreBuilder<NoPersistence> {
    fn new() -> Self {
        Self {
            exposed: Vec::new(),
            multiple: Multiplicity::default(),
            persistence: NoPersistence,
            params: Vec::new(),
        }
    }
}

impl<P: Persistence> StoreBuilder<P> {
    pub fn exposed<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exposed = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn multiple(mut self, multiple: Multiplicity) -> Self {
        self.multiple = multiple;
        self
    }

    pub fn persistence<Q: Persistence>(self, persistence: Q) -> StoreBuilder<Q> {
        StoreBuilder {
            exposed: self.exposed,
            multiple: self.multiple,
            persistence,
            params: self.params,
        }
    }

    /// A value the store starts out with, added through [`ParameterStore::add_by_value`]
    pub fn param<N, V>(mut self, name: N, value: V) -> Self
    where
        N: Into<String>,
        V: Into<Value>,
    {
        self.params.push((name.into(), value.into()));
        self
    }

    pub fn build(self) -> ParameterStore<P> {
        let mut store = ParameterStore {
            params: Vec::new(),
            exposed: self.exposed,
            multiple: self.multiple,
            persistence: self.persistence,
        };
        for (name, value) in self.params {
            store.add_by_value(&name, value);
        }
        store
    }
}
