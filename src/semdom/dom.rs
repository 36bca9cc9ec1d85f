//! Tree-manipulation facade
//!
//! The engine consumes markup trees through this module: parse text into a
//! [`Document`], query and mutate nodes by [`NodeId`] handle, serialize the
//! (possibly mutated) tree back to text. Node identity is an arena index, so
//! a handle stays cheap to copy and never dangles even after the node is
//! detached from the tree; structural relationships (parent, children) are
//! always re-resolved against the document at the moment they are needed.
//!
//! The parser is deliberately lenient: mismatched or missing close tags are
//! tolerated, unknown markup is kept as text. This is a facade for content
//! processing, not a standards-complete HTML parser.

pub mod document;
pub mod parser;
pub mod selector;
pub mod serializer;
pub mod tokens;

pub use document::{Document, DomError, ElementData, NodeId, NodeKind};
pub use selector::Selector;
