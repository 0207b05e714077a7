//! Heap values the engine never looks inside.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use ulid::Ulid;

use super::Value;

/// A unique token. Two symbols are never equal unless they are the same handle.
#[derive(Clone)]
pub struct Symbol(Arc<SymbolInner>);

struct SymbolInner {
    id: Ulid,
    description: Option<Arc<str>>,
}

heap_handle!(Symbol);

impl Symbol {
    pub fn new(description: Option<Arc<str>>) -> Self {
        Self(Arc::new(SymbolInner {
            id: Ulid::new(),
            description,
        }))
    }

    pub fn id(&self) -> Ulid {
        self.0.id
    }

    pub fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description().unwrap_or(""))
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} #{}", self, self.0.id)
    }
}

/// A named, immutable namespace object shared by every program.
#[derive(Clone)]
pub struct OpaqueConstant(Arc<ConstantInner>);

struct ConstantInner {
    name: Arc<str>,
    members: IndexMap<Arc<str>, Value>,
}

heap_handle!(OpaqueConstant);

static MATH: Lazy<OpaqueConstant> = Lazy::new(|| {
    use std::f64::consts;
    OpaqueConstant::new(
        "Math",
        [
            ("E", consts::E),
            ("LN10", consts::LN_10),
            ("LN2", consts::LN_2),
            ("LOG10E", consts::LOG10_E),
            ("LOG2E", consts::LOG2_E),
            ("PI", consts::PI),
            ("SQRT1_2", consts::FRAC_1_SQRT_2),
            ("SQRT2", consts::SQRT_2),
        ]
        .into_iter()
        .map(|(name, n)| (name, Value::Number(n))),
    )
});

impl OpaqueConstant {
    pub fn new(
        name: impl Into<Arc<str>>,
        members: impl IntoIterator<Item = (impl Into<Arc<str>>, Value)>,
    ) -> Self {
        Self(Arc::new(ConstantInner {
            name: name.into(),
            members: members
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }))
    }

    /// The process-wide math namespace. Every call returns the same handle.
    pub fn math() -> OpaqueConstant {
        MATH.clone()
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn get(&self, member: &str) -> Option<Value> {
        self.0.members.get(member).cloned()
    }
}

impl fmt::Debug for OpaqueConstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueConstant").field(&self.0.name).finish()
    }
}

/// An already-serialized document carried through unchanged.
#[derive(Clone)]
pub struct SerializedPayload(Arc<serde_json::Value>);

heap_handle!(SerializedPayload);

impl SerializedPayload {
    pub fn new(document: serde_json::Value) -> Self {
        Self(Arc::new(document))
    }

    pub fn document(&self) -> &serde_json::Value {
        &self.0
    }
}

impl fmt::Debug for SerializedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SerializedPayload({})", self.0)
    }
}

/// A suspended iteration. Advancing it through any handle advances it for all.
#[derive(Clone)]
pub struct Generator(Arc<Mutex<Box<dyn Iterator<Item = Value> + Send>>>);

heap_handle!(Generator);

impl Generator {
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: Send + 'static,
    {
        Self(Arc::new(Mutex::new(Box::new(iter.into_iter()))))
    }

    pub fn next_value(&self) -> Option<Value> {
        self.0.lock().next()
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Generator { .. }")
    }
}

/// A compiled code unit, held as its bytes.
#[derive(Clone)]
pub struct CompiledModule(Arc<ModuleInner>);

struct ModuleInner {
    name: Arc<str>,
    bytes: Arc<[u8]>,
}

heap_handle!(CompiledModule);

impl CompiledModule {
    pub fn new(name: impl Into<Arc<str>>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self(Arc::new(ModuleInner {
            name: name.into(),
            bytes: bytes.into(),
        }))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0.bytes
    }
}

impl fmt::Debug for CompiledModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledModule")
            .field("name", &self.0.name)
            .field("len", &self.0.bytes.len())
            .finish()
    }
}
