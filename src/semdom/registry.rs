//! Plugin factory registry
//!
//! Maps plugin identifiers to constructor closures taking the plugin's
//! configuration. The engine resolves every configured analyzer and
//! processor through a registry once per invocation; nothing about a
//! concrete plugin is hard-coded into the engine.

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::semdom::builtin;
use crate::semdom::plugin::{DataProcessor, SemanticAnalyzer};

/// Error resolving a plugin id.
#[derive(Debug, Clone, PartialEq)]
pub enum RegistryError {
    AnalyzerNotFound(String),
    ProcessorNotFound(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AnalyzerNotFound(id) => write!(f, "Analyzer '{id}' not found"),
            RegistryError::ProcessorNotFound(id) => write!(f, "Processor '{id}' not found"),
        }
    }
}

impl std::error::Error for RegistryError {}

type AnalyzerCtor = Box<dyn Fn(&Value) -> Box<dyn SemanticAnalyzer>>;
type ProcessorCtor = Box<dyn Fn(&Value) -> Box<dyn DataProcessor>>;

/// Registry of analyzer and processor constructors.
pub struct PluginRegistry {
    analyzers: HashMap<String, AnalyzerCtor>,
    processors: HashMap<String, ProcessorCtor>,
}

impl PluginRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        PluginRegistry {
            analyzers: HashMap::new(),
            processors: HashMap::new(),
        }
    }

    /// Create a registry with the built-in plugins registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        builtin::register(&mut registry);
        registry
    }

    /// Register an analyzer constructor. An existing registration under
    /// the same id is replaced.
    pub fn register_analyzer<F>(&mut self, id: &str, ctor: F)
    where
        F: Fn(&Value) -> Box<dyn SemanticAnalyzer> + 'static,
    {
        self.analyzers.insert(id.to_string(), Box::new(ctor));
    }

    /// Register a processor constructor.
    pub fn register_processor<F>(&mut self, id: &str, ctor: F)
    where
        F: Fn(&Value) -> Box<dyn DataProcessor> + 'static,
    {
        self.processors.insert(id.to_string(), Box::new(ctor));
    }

    /// Instantiate an analyzer with its configuration.
    pub fn create_analyzer(
        &self,
        id: &str,
        config: &Value,
    ) -> Result<Box<dyn SemanticAnalyzer>, RegistryError> {
        let ctor = self
            .analyzers
            .get(id)
            .ok_or_else(|| RegistryError::AnalyzerNotFound(id.to_string()))?;
        Ok(ctor(config))
    }

    /// Instantiate a processor with its configuration.
    pub fn create_processor(
        &self,
        id: &str,
        config: &Value,
    ) -> Result<Box<dyn DataProcessor>, RegistryError> {
        let ctor = self
            .processors
            .get(id)
            .ok_or_else(|| RegistryError::ProcessorNotFound(id.to_string()))?;
        Ok(ctor(config))
    }

    pub fn has_analyzer(&self, id: &str) -> bool {
        self.analyzers.contains_key(id)
    }

    pub fn has_processor(&self, id: &str) -> bool {
        self.processors.contains_key(id)
    }

    /// All registered analyzer ids (sorted).
    pub fn analyzer_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.analyzers.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// All registered processor ids (sorted).
    pub fn processor_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.processors.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
