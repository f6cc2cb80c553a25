//! Abstract syntax tree
//!
//! One tagged node type covers every construct; see [`nodes`]. Every node
//! owns its children outright and carries the source [`range::Range`] it
//! was parsed from.

pub mod nodes;
pub mod range;

pub use nodes::{
    DictEntry, Element, ElifClause, ExceptClause, ImportName, Node, NodeKind, Operator,
    OperatorDescriptor, Parameter, Program, RefKind, SubjectKind, Variant,
};
pub use range::{Position, Range, SourceLocation};
