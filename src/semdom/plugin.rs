//! Plugin capability contracts
//!
//! Analyzers and processors are the two externally implemented
//! capabilities the engine calls through. Analyzers are pure with respect
//! to the tree: they read a node and refine its context. Processors may
//! mutate the tree and thread the result accumulator forward.
//!
//! Control flow is explicit values, not unwinding: an analyzer returns an
//! [`Analysis`] outcome (ok, warning-with-context, or per-node error), and
//! a processor signals reprocessing through the accumulator it returns.
//! The `Err` channel of both traits is reserved for contract violations —
//! programming errors in a plugin — and aborts the whole invocation.

use std::fmt;

use crate::semdom::context::SemanticContext;
use crate::semdom::dom::Document;
use crate::semdom::result::ProcessorResult;

/// Outcome of analyzing one node.
#[derive(Debug, Clone)]
pub enum Analysis {
    /// Analysis succeeded; continue with this context.
    Ok(SemanticContext),
    /// Non-fatal condition: the context is tagged under `warning` and the
    /// remaining analyzers still run.
    Warning {
        data: SemanticContext,
        message: String,
    },
    /// Fatal for this node only: the node is detached (unless root), the
    /// context is tagged under `error`, and the subtree is abandoned.
    Error { message: String },
}

/// A programming error in a plugin. Not part of the warning/error
/// taxonomy: it propagates out of the engine as an invocation failure.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginViolation {
    pub message: String,
}

impl PluginViolation {
    pub fn new(message: impl Into<String>) -> Self {
        PluginViolation {
            message: message.into(),
        }
    }
}

impl fmt::Display for PluginViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Plugin contract violation: {}", self.message)
    }
}

impl std::error::Error for PluginViolation {}

/// Read-only semantic tagging of a single node.
pub trait SemanticAnalyzer {
    fn analyze(&self, doc: &Document, data: SemanticContext) -> Result<Analysis, PluginViolation>;
}

/// Side-effecting transformation of a single node.
pub trait DataProcessor {
    fn process(
        &self,
        doc: &mut Document,
        data: &SemanticContext,
        result: ProcessorResult,
    ) -> Result<ProcessorResult, PluginViolation>;
}
