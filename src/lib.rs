//! # semdom
//!
//! Semantic DOM processing pipelines for markup transformation.
//!
//! A configurable, ordered pipeline of semantic analyzers and content
//! processors is applied to every node of a parsed markup tree, producing a
//! transformed document plus an accumulated result payload (extracted
//! metadata, attachments, rewritten markup). Processors may request
//! reprocessing when a transformation invalidates prior analysis.
//!
//! The entry point is [`semdom::engine::DomProcessor`].

pub mod semdom;
