use std::fmt;
use std::sync::Arc;

use super::Value;

/// A runtime error value: a name/kind label, a message, and optional
/// diagnostic metadata.
#[derive(Clone)]
pub struct ErrorObject(Arc<ErrorInner>);

#[derive(Clone)]
struct ErrorInner {
    name: Arc<str>,
    message: Arc<str>,
    stack: Option<Arc<str>>,
    cause: Option<Value>,
}

heap_handle!(ErrorObject);

impl ErrorObject {
    pub fn new(name: impl Into<Arc<str>>, message: impl Into<Arc<str>>) -> Self {
        Self(Arc::new(ErrorInner {
            name: name.into(),
            message: message.into(),
            stack: None,
            cause: None,
        }))
    }

    /// An error with the generic `Error` name.
    pub fn generic(message: impl Into<Arc<str>>) -> Self {
        Self::new("Error", message)
    }

    pub fn with_stack(self, stack: impl Into<Arc<str>>) -> Self {
        let mut inner = (*self.0).clone();
        inner.stack = Some(stack.into());
        Self(Arc::new(inner))
    }

    pub fn with_cause(self, cause: Value) -> Self {
        let mut inner = (*self.0).clone();
        inner.cause = Some(cause);
        Self(Arc::new(inner))
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn message(&self) -> &str {
        &self.0.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.0.stack.as_deref()
    }

    pub fn cause(&self) -> Option<&Value> {
        self.0.cause.as_ref()
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.message.is_empty() {
            write!(f, "{}", self.0.name)
        } else {
            write!(f, "{}: {}", self.0.name, self.0.message)
        }
    }
}

impl fmt::Debug for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorObject")
            .field("name", &self.0.name)
            .field("message", &self.0.message)
            .finish_non_exhaustive()
    }
}
