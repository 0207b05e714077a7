use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::category::{Category, Classify, NativeClassifier};
use crate::error::DuplicateError;
use crate::options::DuplicateOptions;
use crate::strategy::StrategyTable;
use crate::value::Value;

static STANDARD: Lazy<Duplicator> = Lazy::new(Duplicator::new);

/// Classifies values and hands each one to the strategy registered for its
/// category.
#[derive(Clone)]
pub struct Duplicator {
    table: Arc<StrategyTable>,
    classifier: Arc<dyn Classify>,
    options: DuplicateOptions,
}

impl Duplicator {
    /// The built-in table with the native classifier and default options.
    pub fn new() -> Self {
        Self {
            table: StrategyTable::standard(),
            classifier: Arc::new(NativeClassifier),
            options: DuplicateOptions::default(),
        }
    }

    /// The process-wide default instance.
    pub fn standard() -> &'static Duplicator {
        &STANDARD
    }

    pub fn with_table(mut self, table: impl Into<Arc<StrategyTable>>) -> Self {
        self.table = table.into();
        self
    }

    pub fn with_classifier(mut self, classifier: impl Classify + 'static) -> Self {
        self.classifier = Arc::new(classifier);
        self
    }

    pub fn with_options(mut self, options: DuplicateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn table(&self) -> &StrategyTable {
        &self.table
    }

    pub fn options(&self) -> &DuplicateOptions {
        &self.options
    }

    pub fn classify(&self, value: &Value) -> Category {
        self.classifier.classify(value)
    }

    pub fn duplicate(&self, value: &Value) -> Result<Value, DuplicateError> {
        self.walk(None).duplicate(value)
    }

    /// Duplicate, except that any value (the root included) for which
    /// `should_dup` answers `false` is shared unchanged.
    pub fn duplicate_with(
        &self,
        value: &Value,
        should_dup: &dyn Fn(&Value) -> bool,
    ) -> Result<Value, DuplicateError> {
        self.walk(Some(should_dup)).duplicate(value)
    }

    fn walk<'a>(&'a self, should_dup: Option<&'a dyn Fn(&Value) -> bool>) -> Walk<'a> {
        Walk {
            duplicator: self,
            should_dup,
            visited: self.options.track_cycles.then(HashMap::new),
            depth: 0,
        }
    }
}

impl Default for Duplicator {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Duplicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Duplicator")
            .field("table", &self.table)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// State of one duplication call, threaded through every strategy so that
/// nested values are dispatched the same way as the root.
pub struct Walk<'a> {
    duplicator: &'a Duplicator,
    should_dup: Option<&'a dyn Fn(&Value) -> bool>,
    /// Source address to (source, copy). The source is held so its address
    /// cannot be reused while the walk runs.
    visited: Option<HashMap<usize, (Value, Value)>>,
    depth: usize,
}

impl Walk<'_> {
    pub fn duplicate(&mut self, value: &Value) -> Result<Value, DuplicateError> {
        if let Some(should_dup) = self.should_dup
            && !should_dup(value)
        {
            log::debug!("sharing {} at depth {}", value.category(), self.depth);
            return Ok(value.clone());
        }
        if let Some(copy) = self.recall(value) {
            log::debug!("reusing copy of {} at depth {}", value.category(), self.depth);
            return Ok(copy);
        }

        let duplicator = self.duplicator;
        let category = duplicator.classify(value);
        log::trace!("duplicating {} at depth {}", category, self.depth);
        let strategy = duplicator
            .table
            .get(category)
            .ok_or(DuplicateError::UnrecognizedCategory(category))?;

        self.depth += 1;
        let copy = (**strategy)(self, value);
        self.depth -= 1;

        let copy = copy?;
        self.remember(value, &copy);
        Ok(copy)
    }

    /// Record `copy` as the duplicate of `source`. Containers call this
    /// before visiting their entries so back-references resolve to the copy.
    /// Does nothing unless cycle tracking is on.
    pub fn remember(&mut self, source: &Value, copy: &Value) {
        if let (Some(visited), Some(addr)) = (self.visited.as_mut(), source.heap_addr()) {
            visited
                .entry(addr)
                .or_insert_with(|| (source.clone(), copy.clone()));
        }
    }

    pub fn recall(&self, source: &Value) -> Option<Value> {
        let addr = source.heap_addr()?;
        self.visited
            .as_ref()?
            .get(&addr)
            .map(|(_, copy)| copy.clone())
    }

    pub fn options(&self) -> &DuplicateOptions {
        &self.duplicator.options
    }

    /// Number of strategies currently running; 1 inside the root's strategy.
    pub fn depth(&self) -> usize {
        self.depth
    }
}
