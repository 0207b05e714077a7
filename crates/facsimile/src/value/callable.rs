use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{PropertyMap, Value};

/// Native behavior of a callable. Shared, never copied.
pub type Behavior = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CallableKind {
    Plain,
    /// Produces a [`super::Generator`] when called.
    GeneratorFactory,
    /// Produces a [`super::Deferred`] when called.
    Async,
}

/// A callable value with attached data properties.
///
/// The behavior and source text are immutable; the property bag is not.
#[derive(Clone)]
pub struct Callable(Arc<CallableInner>);

struct CallableInner {
    kind: CallableKind,
    name: Arc<str>,
    source: Arc<str>,
    behavior: Behavior,
    properties: RwLock<PropertyMap>,
}

heap_handle!(Callable);

impl Callable {
    pub fn new<F>(name: impl Into<Arc<str>>, source: impl Into<Arc<str>>, behavior: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        Self::with_kind(CallableKind::Plain, name, source, Arc::new(behavior))
    }

    pub fn with_kind(
        kind: CallableKind,
        name: impl Into<Arc<str>>,
        source: impl Into<Arc<str>>,
        behavior: Behavior,
    ) -> Self {
        Self(Arc::new(CallableInner {
            kind,
            name: name.into(),
            source: source.into(),
            behavior,
            properties: RwLock::new(PropertyMap::new()),
        }))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0.behavior)(args)
    }

    pub fn kind(&self) -> CallableKind {
        self.0.kind
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Textual form the callable was declared with.
    pub fn source(&self) -> &str {
        &self.0.source
    }

    /// Whether both callables run the very same behavior.
    pub fn shares_behavior(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0.behavior, &other.0.behavior)
    }

    pub fn get_property(&self, key: &str) -> Option<Value> {
        self.0.properties.read().get(key).cloned()
    }

    pub fn set_property(&self, key: impl Into<Arc<str>>, value: Value) {
        self.0.properties.write().insert(key, value);
    }

    pub fn define_hidden_property(&self, key: impl Into<Arc<str>>, value: Value) {
        self.0.properties.write().define(key, value, false);
    }

    pub fn enumerable_properties(&self) -> Vec<(Arc<str>, Value)> {
        self.0.properties.read().enumerable_entries()
    }

    /// A new callable with the same kind, name, source and behavior but an
    /// empty property bag.
    pub(crate) fn sibling(&self) -> Callable {
        Self::with_kind(
            self.0.kind,
            self.0.name.clone(),
            self.0.source.clone(),
            self.0.behavior.clone(),
        )
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .finish_non_exhaustive()
    }
}
