//! Per-request store of loaded parameter values.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A resolved parameter value, or *undefined*.
///
/// Values are type-erased and shared: cloning a `ParamValue` clones an `Arc`,
/// never the value itself. Undefined is what gets cached when a parameter has
/// no raw value and no loader, or when its loader failed without a
/// `load_error` hook.
#[derive(Clone, Default)]
pub struct ParamValue(Option<Arc<dyn Any + Send + Sync>>);

impl ParamValue {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Some(Arc::new(value)))
    }

    pub fn undefined() -> Self {
        Self(None)
    }

    pub fn is_undefined(&self) -> bool {
        self.0.is_none()
    }

    /// Undefined, or an empty `String`. These are the values that trigger a
    /// parameter's `not_found` hook.
    pub fn is_falsy(&self) -> bool {
        match &self.0 {
            None => true,
            Some(v) => v.downcast_ref::<String>().is_some_and(String::is_empty),
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref()
    }

    /// Shared handle to the value, if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(self.0.as_ref()?).downcast().ok()
    }

    /// `true` when both point at the same stored value (or both are undefined).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl fmt::Debug for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(_) => f.write_str("ParamValue(..)"),
            None => f.write_str("ParamValue(undefined)"),
        }
    }
}

/// One or more aliases, for [`ParamStore::pick`].
///
/// Implemented for a single `&str` and for slices, arrays and vectors of
/// string-likes, so both `store.pick("user")` and `store.pick(["user", "post"])`
/// work.
pub trait Aliases {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str));
}

impl Aliases for &str {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str)) {
        f(*self)
    }
}

impl Aliases for String {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str)) {
        f(self.as_str())
    }
}

impl<S: AsRef<str>> Aliases for [S] {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str)) {
        self.iter().for_each(|s| f(s.as_ref()))
    }
}

impl<S: AsRef<str>, const N: usize> Aliases for [S; N] {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str)) {
        self.as_slice().for_each_alias(f)
    }
}

impl<S: AsRef<str>> Aliases for Vec<S> {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str)) {
        self.as_slice().for_each_alias(f)
    }
}

impl<S: AsRef<str>> Aliases for &[S] {
    fn for_each_alias(&self, f: &mut dyn FnMut(&str)) {
        (**self).for_each_alias(f)
    }
}

/// Alias → value map scoped to a single request.
///
/// The map does not allocate until the first [`set`](ParamStore::set).
/// Setting an alias twice overwrites; reads never mutate.
#[derive(Clone, Debug, Default)]
pub struct ParamStore {
    values: HashMap<String, ParamValue>,
}

impl ParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, alias: impl Into<String>, value: ParamValue) {
        self.values.insert(alias.into(), value);
    }

    pub fn get(&self, alias: &str) -> Option<&ParamValue> {
        self.values.get(alias)
    }

    /// Typed read. `None` when the alias is missing, undefined, or not a `T`.
    pub fn get_as<T: Any>(&self, alias: &str) -> Option<&T> {
        self.get(alias)?.downcast_ref()
    }

    pub fn all(&self) -> &HashMap<String, ParamValue> {
        &self.values
    }

    /// The entries whose alias is listed. Missing aliases are left out.
    pub fn pick(&self, aliases: impl Aliases) -> HashMap<String, ParamValue> {
        let mut picked = HashMap::new();
        aliases.for_each_alias(&mut |alias: &str| {
            if let Some((k, v)) = self.values.get_key_value(alias) {
                picked.insert(k.clone(), v.clone());
            }
        });
        picked
    }

    pub fn has(&self, alias: &str) -> bool {
        self.values.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Access to the loaded-parameter store of a request-like value.
///
/// Downstream handlers depend on this capability rather than on where the
/// store lives. Only the two accessors are required.
pub trait LoadedParams {
    fn param_store(&self) -> &ParamStore;
    fn param_store_mut(&mut self) -> &mut ParamStore;

    fn add_loaded_param(&mut self, alias: &str, value: ParamValue) -> &mut Self {
        self.param_store_mut().set(alias, value);
        self
    }

    fn loaded_param(&self, alias: &str) -> Option<&ParamValue> {
        self.param_store().get(alias)
    }

    fn loaded_param_as<T: Any>(&self, alias: &str) -> Option<&T> {
        self.param_store().get_as(alias)
    }

    fn loaded_params(&self) -> &HashMap<String, ParamValue> {
        self.param_store().all()
    }

    fn pick_loaded_params(&self, aliases: impl Aliases) -> HashMap<String, ParamValue> {
        self.param_store().pick(aliases)
    }

    fn has_loaded_param(&self, alias: &str) -> bool {
        self.param_store().has(alias)
    }
}

impl LoadedParams for ParamStore {
    fn param_store(&self) -> &ParamStore {
        self
    }

    fn param_store_mut(&mut self) -> &mut ParamStore {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> ParamStore {
        let mut store = ParamStore::new();
        store.set("a", ParamValue::new(1i32));
        store.set("b", ParamValue::new(2i32));
        store.set("c", ParamValue::new(3i32));
        store
    }

    #[test]
    fn empty_store_reads_as_empty() {
        let store = ParamStore::new();
        assert!(store.all().is_empty());
        assert!(store.get("a").is_none());
        assert!(!store.has("a"));
    }

    #[test]
    fn set_overwrites() {
        let mut store = ParamStore::new();
        store.set("id", ParamValue::new(1u32));
        store.set("id", ParamValue::new(2u32));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_as::<u32>("id"), Some(&2));
    }

    #[test]
    fn repeated_reads_return_the_same_value() {
        let store = abc();
        let first = store.get("b").cloned().unwrap();
        let second = store.get("b").cloned().unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn pick_returns_only_requested_entries() {
        let picked = abc().pick(["a", "c"]);

        assert_eq!(picked.len(), 2);
        assert_eq!(picked["a"].downcast_ref::<i32>(), Some(&1));
        assert_eq!(picked["c"].downcast_ref::<i32>(), Some(&3));
    }

    #[test]
    fn pick_omits_missing_aliases() {
        let store = abc();

        let picked = store.pick(vec!["a".to_owned(), "zzz".to_owned()]);
        assert_eq!(picked.keys().collect::<Vec<_>>(), vec!["a"]);

        assert_eq!(store.pick("b").len(), 1);
        assert!(store.pick("nope").is_empty());
    }

    #[test]
    fn undefined_is_stored_and_falsy() {
        let mut store = ParamStore::new();
        store.set("user", ParamValue::undefined());

        assert!(store.has("user"));
        assert!(store.get("user").is_some_and(ParamValue::is_undefined));
        assert!(store.get_as::<String>("user").is_none());
    }

    #[test]
    fn falsiness() {
        assert!(ParamValue::undefined().is_falsy());
        assert!(ParamValue::new(String::new()).is_falsy());
        assert!(!ParamValue::new("0".to_owned()).is_falsy());
        assert!(!ParamValue::new(0u32).is_falsy());
    }

    #[test]
    fn capability_trait_delegates_to_store() {
        let mut store = ParamStore::new();
        store.add_loaded_param("post", ParamValue::new("hello".to_owned()));

        assert!(store.has_loaded_param("post"));
        assert_eq!(store.loaded_param_as::<String>("post").map(String::as_str), Some("hello"));
        assert_eq!(store.loaded_params().len(), 1);
        assert_eq!(store.pick_loaded_params(["post", "user"]).len(), 1);
    }
}
