//! Declarative pipeline configuration
//!
//! A stack names an ordered list of analyzers shared by all of its
//! variants, plus named variants each carrying an ordered list of
//! processors. Stacks are plain data: the engine only reads them, and they
//! round-trip through serde (YAML stack files are what the CLI loads).
//!
//! Ordering is significant, so plugin lists are sequences of entries, not
//! maps.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::semdom::tags;

/// One configured plugin: identifier plus its configuration mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginEntry {
    pub id: String,
    #[serde(default = "tags::empty")]
    pub config: Value,
}

impl PluginEntry {
    pub fn new(id: &str, config: Value) -> Self {
        PluginEntry {
            id: id.to_string(),
            config,
        }
    }
}

/// A named, alternate ordered list of processors sharing the stack's
/// analyzer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub processors: Vec<PluginEntry>,
}

/// Declarative pipeline definition: ordered analyzers + named variants.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub analyzers: Vec<PluginEntry>,
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

impl StackConfig {
    pub fn new(label: &str) -> Self {
        StackConfig {
            label: label.to_string(),
            ..Default::default()
        }
    }

    /// The stack-wide ordered analyzer list.
    pub fn analyzers(&self) -> &[PluginEntry] {
        &self.analyzers
    }

    /// Look up a variant by name.
    ///
    /// The `default` variant always exists: when no variant named
    /// `default` is configured, an empty one (label "Default") is
    /// synthesized. Any other unknown name is absent.
    pub fn variant(&self, name: &str) -> Option<VariantConfig> {
        if let Some(variant) = self.variants.iter().find(|v| v.name == name) {
            return Some(variant.clone());
        }
        if name == "default" {
            return Some(VariantConfig {
                name: "default".to_string(),
                label: "Default".to_string(),
                processors: Vec::new(),
            });
        }
        None
    }

    /// Builder: append an analyzer.
    pub fn with_analyzer(mut self, id: &str, config: Value) -> Self {
        self.analyzers.push(PluginEntry::new(id, config));
        self
    }

    /// Builder: append a processor to a variant, creating the variant if
    /// needed.
    pub fn with_processor(mut self, variant: &str, id: &str, config: Value) -> Self {
        match self.variants.iter_mut().find(|v| v.name == variant) {
            Some(existing) => existing.processors.push(PluginEntry::new(id, config)),
            None => self.variants.push(VariantConfig {
                name: variant.to_string(),
                label: String::new(),
                processors: vec![PluginEntry::new(id, config)],
            }),
        }
        self
    }
}
