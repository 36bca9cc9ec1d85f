//! Traversal engine
//!
//! `DomProcessor` orchestrates the whole pipeline: parse the markup, build
//! the root context, resolve the configured plugins, run the two-phase
//! walk, and serialize the transformed tree back under the reserved
//! `markup` key.
//!
//! The walk is an explicit work-stack traversal, not naive recursion, so
//! stack depth stays bounded on deep or wide documents. Analyzers observe
//! nodes in pre-order; processors observe them post-order relative to the
//! analyze order. A processor returning an accumulator that needs
//! reprocessing sends the walk back to the analyze phase at the resume
//! context (or the current one); both stacks are revisited until empty.
//!
//! The engine enforces no reprocess-cycle cap: termination is the
//! responsibility of the plugins (typically via a marker attribute). A
//! caller wanting bounded execution must wrap `process` with an external
//! counter.

use std::cell::RefCell;
use std::fmt;

use log::{debug, trace};
use serde_json::{json, Value};

use crate::semdom::context::SemanticContext;
use crate::semdom::dom::Document;
use crate::semdom::plugin::{Analysis, DataProcessor, PluginViolation, SemanticAnalyzer};
use crate::semdom::registry::{PluginRegistry, RegistryError};
use crate::semdom::result::ProcessorResult;
use crate::semdom::stack::StackConfig;
use crate::semdom::tags;

/// Errors that abort a `process` invocation.
///
/// Per-node analyzer warnings and errors never surface here; they are
/// contained in the walk and exposed as `warning`/`error` tags on the
/// affected contexts.
#[derive(Debug)]
pub enum ProcessError {
    /// A configured plugin id is not registered
    Registry(RegistryError),
    /// A plugin committed a contract violation
    Plugin {
        id: String,
        violation: PluginViolation,
    },
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Registry(err) => write!(f, "{err}"),
            ProcessError::Plugin { id, violation } => {
                write!(f, "Plugin '{id}' failed: {violation}")
            }
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Registry(err) => Some(err),
            ProcessError::Plugin { violation, .. } => Some(violation),
        }
    }
}

impl From<RegistryError> for ProcessError {
    fn from(err: RegistryError) -> Self {
        ProcessError::Registry(err)
    }
}

// Ambient seed tags of still-open invocations, innermost last. Lets an
// outer pipeline stage pass context (e.g. a language code) down into a
// nested invocation it triggers. The engine is single-threaded by design,
// so a thread-local stack is the whole mechanism.
thread_local! {
    static AMBIENT_SEEDS: RefCell<Vec<Value>> = const { RefCell::new(Vec::new()) };
}

fn effective_seed(explicit: Value) -> Value {
    let mut seed = AMBIENT_SEEDS
        .with(|stack| stack.borrow().last().cloned())
        .unwrap_or_else(tags::empty);
    let explicit = if explicit.is_object() {
        explicit
    } else {
        tags::empty()
    };
    tags::merge_deep(&mut seed, &explicit);
    seed
}

enum Analyzed {
    Ok(SemanticContext),
    /// Analyzer error: node detached (unless root), subtree abandoned
    Failed(SemanticContext),
}

type AnalyzerSet = Vec<(String, Box<dyn SemanticAnalyzer>)>;
type ProcessorSet = Vec<(String, Box<dyn DataProcessor>)>;

/// Applies analyzer/processor stacks to markup documents.
pub struct DomProcessor {
    registry: PluginRegistry,
}

impl DomProcessor {
    /// Create an engine with the default plugin registry.
    pub fn new() -> Self {
        Self::with_registry(PluginRegistry::with_defaults())
    }

    /// Create an engine with a custom plugin registry.
    pub fn with_registry(registry: PluginRegistry) -> Self {
        DomProcessor { registry }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Process a markup fragment through a stack.
    ///
    /// Runs the stack's analyzers plus the processors of the named variant
    /// (an unknown variant name yields no processors). `seed` becomes the
    /// root context's tagged data; when this call is nested inside another
    /// still-open invocation, the outer invocation's seed tags are merged
    /// in first and overridden by the explicit ones.
    ///
    /// The returned accumulator always carries the final serialized
    /// document under `markup`.
    pub fn process(
        &self,
        markup: &str,
        stack: &StackConfig,
        variant_name: &str,
        seed: Value,
    ) -> Result<ProcessorResult, ProcessError> {
        let analyzers: AnalyzerSet = stack
            .analyzers()
            .iter()
            .map(|entry| {
                Ok((
                    entry.id.clone(),
                    self.registry.create_analyzer(&entry.id, &entry.config)?,
                ))
            })
            .collect::<Result<_, RegistryError>>()?;

        let processors: ProcessorSet = match stack.variant(variant_name) {
            Some(variant) => variant
                .processors
                .iter()
                .map(|entry| {
                    Ok((
                        entry.id.clone(),
                        self.registry.create_processor(&entry.id, &entry.config)?,
                    ))
                })
                .collect::<Result<_, RegistryError>>()?,
            None => Vec::new(),
        };

        let mut doc = Document::parse(markup);
        let root = doc.content_root();
        let seed = effective_seed(seed);
        debug!(
            "processing markup ({} analyzers, {} processors, variant '{}')",
            analyzers.len(),
            processors.len(),
            variant_name
        );

        AMBIENT_SEEDS.with(|stack| stack.borrow_mut().push(seed.clone()));
        let walked = self.walk(
            &mut doc,
            SemanticContext::new(root, seed),
            &analyzers,
            &processors,
        );
        AMBIENT_SEEDS.with(|stack| {
            stack.borrow_mut().pop();
        });

        let result = walked?;
        Ok(result.merge_data(&json!({ "markup": doc.serialize() }), true))
    }

    /// Apply several (stack, variant) passes in sequence, each pass
    /// reading the previous pass's `markup` output. Results (including
    /// any `attachments`) merge across passes.
    pub fn process_chain(
        &self,
        markup: &str,
        passes: &[(&StackConfig, &str)],
        seed: Value,
    ) -> Result<ProcessorResult, ProcessError> {
        let mut result = ProcessorResult::with_data(json!({ "markup": markup }));
        for (stack, variant_name) in passes {
            let input = result
                .get("markup")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            let pass = self.process(&input, stack, variant_name, seed.clone())?;
            result = result.merge(&pass, true);
        }
        Ok(result)
    }

    fn walk(
        &self,
        doc: &mut Document,
        root: SemanticContext,
        analyzers: &AnalyzerSet,
        processors: &ProcessorSet,
    ) -> Result<ProcessorResult, ProcessError> {
        let mut to_analyze = vec![root];
        let mut pending: Vec<SemanticContext> = Vec::new();
        let mut result = ProcessorResult::new();
        let mut cycles = 0usize;

        while !to_analyze.is_empty() || !pending.is_empty() {
            // Analyze phase: pre-order over the to-analyze stack.
            while let Some(ctx) = to_analyze.pop() {
                let ctx = ctx.clear(&["error", "warning"]);
                match self.analyze_node(doc, ctx, analyzers)? {
                    Analyzed::Ok(ctx) => {
                        let children = doc.children(ctx.node()).to_vec();
                        for &child in children.iter().rev() {
                            to_analyze.push(ctx.push(child));
                        }
                        pending.push(ctx);
                    }
                    // The subtree is abandoned with the node; processors
                    // still see the errored context.
                    Analyzed::Failed(ctx) => pending.push(ctx),
                }
            }

            // Process phase: post-order relative to analyze order.
            'process: while let Some(ctx) = pending.pop() {
                for (id, processor) in processors {
                    result = processor.process(doc, &ctx, result).map_err(|violation| {
                        ProcessError::Plugin {
                            id: id.clone(),
                            violation,
                        }
                    })?;
                    if result.needs_reprocess() {
                        let (consumed, resume) = result.consume_reprocess();
                        result = consumed;
                        cycles += 1;
                        trace!("reprocess #{cycles} requested by '{id}'");
                        to_analyze.push(resume.unwrap_or_else(|| ctx.clone()));
                        break 'process;
                    }
                }
            }
        }

        debug!("walk finished after {cycles} reprocess cycles");
        Ok(result)
    }

    fn analyze_node(
        &self,
        doc: &mut Document,
        ctx: SemanticContext,
        analyzers: &AnalyzerSet,
    ) -> Result<Analyzed, ProcessError> {
        let mut current = ctx;
        for (id, analyzer) in analyzers {
            let analysis =
                analyzer
                    .analyze(doc, current.clone())
                    .map_err(|violation| ProcessError::Plugin {
                        id: id.clone(),
                        violation,
                    })?;
            match analysis {
                Analysis::Ok(next) => current = next,
                Analysis::Warning { data, message } => {
                    trace!("analyzer '{id}' warning: {message}");
                    current = data.tag(
                        "warning",
                        json!({ "plugin": id, "message": message }),
                        false,
                    );
                }
                Analysis::Error { message } => {
                    debug!("analyzer '{id}' error, abandoning node: {message}");
                    if !current.is_root() {
                        doc.detach(current.node());
                    }
                    current = current.tag(
                        "error",
                        json!({ "plugin": id, "message": message }),
                        false,
                    );
                    return Ok(Analyzed::Failed(current));
                }
            }
        }
        Ok(Analyzed::Ok(current))
    }
}

impl Default for DomProcessor {
    fn default() -> Self {
        Self::new()
    }
}
