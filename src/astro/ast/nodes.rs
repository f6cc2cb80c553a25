//! AST node catalogue
//!
//! Expression-like constructs and declarations share one [`Node`] type: a
//! [`NodeKind`] payload plus two optional cross-cutting fields, the
//! reference kind (`val`/`ref`/`iso`/`acq`) and a type annotation kept as
//! surface text. Sequence fields (bodies, parameters, elements) keep source
//! order.

use super::range::Range;
use crate::astro::lexing::tokens::Base;
use serde::Serialize;

/// How ownership of a value is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Value,
    Reference,
    Isolated,
    Acquired,
}

impl RefKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "val" => Some(RefKind::Value),
            "ref" => Some(RefKind::Reference),
            "iso" => Some(RefKind::Isolated),
            "acq" => Some(RefKind::Acquired),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            RefKind::Value => "val",
            RefKind::Reference => "ref",
            RefKind::Isolated => "iso",
            RefKind::Acquired => "acq",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Symbol(String),
    /// Keyword operators, multi-word ones merged with a single space
    /// (`is not`, `not in`).
    Keyword(String),
}

impl Operator {
    pub fn text(&self) -> &str {
        match self {
            Operator::Symbol(text) | Operator::Keyword(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorDescriptor {
    /// `.+` applies `+` element-wise.
    pub vectorized: bool,
    pub operator: Operator,
}

impl OperatorDescriptor {
    pub fn symbol(text: impl Into<String>) -> Self {
        Self {
            vectorized: false,
            operator: Operator::Symbol(text.into()),
        }
    }

    pub fn keyword(text: impl Into<String>) -> Self {
        Self {
            vectorized: false,
            operator: Operator::Keyword(text.into()),
        }
    }

    pub fn vectorized(mut self) -> Self {
        self.vectorized = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Let,
    Var,
    Const,
}

impl SubjectKind {
    pub fn is_constant(self) -> bool {
        !matches!(self, SubjectKind::Var)
    }
}

/// A function parameter or a type/enum field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigil: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<RefKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Node>,
    pub range: Range,
}

/// A tuple element or call argument, optionally labelled (`x: 1`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DictEntry {
    pub key: Node,
    pub value: Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variant {
    pub name: String,
    pub fields: Vec<Parameter>,
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportName {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElifClause {
    pub condition: Node,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExceptClause {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    pub body: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    // Declarations
    Module {
        name: String,
        body: Vec<Node>,
    },
    Import {
        module: String,
        alias: Option<String>,
        names: Vec<ImportName>,
    },
    TypeDef {
        name: String,
        fields: Vec<Parameter>,
        parents: Vec<String>,
        body: Vec<Node>,
    },
    EnumDef {
        name: String,
        fields: Vec<Parameter>,
        variants: Vec<Variant>,
    },
    FunctionDef {
        name: String,
        params: Vec<Parameter>,
        returns: Option<String>,
        body: Vec<Node>,
    },
    PropertyDef {
        name: String,
        getter: Option<Box<Node>>,
        setter: Option<Box<Node>>,
    },
    Subject {
        kind: SubjectKind,
        name: String,
        value: Option<Box<Node>>,
    },

    // Control flow
    If {
        condition: Box<Node>,
        body: Vec<Node>,
        elifs: Vec<ElifClause>,
        else_body: Vec<Node>,
    },
    While {
        condition: Box<Node>,
        body: Vec<Node>,
    },
    Loop {
        body: Vec<Node>,
    },
    For {
        targets: Vec<String>,
        iterable: Box<Node>,
        body: Vec<Node>,
    },
    Try {
        body: Vec<Node>,
        excepts: Vec<ExceptClause>,
        ensure: Vec<Node>,
    },
    Defer {
        body: Vec<Node>,
    },

    // Control primitives
    Return {
        value: Option<Box<Node>>,
    },
    Yield {
        from: bool,
        value: Option<Box<Node>>,
    },
    Raise {
        value: Option<Box<Node>>,
    },
    Break {
        value: Option<Box<Node>>,
        label: Option<String>,
    },
    Continue {
        label: Option<String>,
    },
    Fallthrough {
        label: Option<String>,
    },
    Pass,

    // Expressions
    Assignment {
        target: Box<Node>,
        operator: String,
        value: Box<Node>,
    },
    /// A flat operand/operator run; `operators.len() == operands.len() - 1`.
    Infix {
        operands: Vec<Node>,
        operators: Vec<OperatorDescriptor>,
    },
    PrefixAtom {
        operator: OperatorDescriptor,
        operand: Box<Node>,
    },
    PostfixAtom {
        operand: Box<Node>,
        operator: OperatorDescriptor,
    },
    Call {
        callee: Box<Node>,
        vectorized: bool,
        arguments: Vec<Element>,
    },
    Dot {
        object: Box<Node>,
        field: String,
    },
    Index {
        object: Box<Node>,
        indices: Vec<Node>,
    },
    Slice {
        start: Option<Box<Node>>,
        stop: Option<Box<Node>>,
        step: Option<Box<Node>>,
    },
    Await {
        value: Box<Node>,
    },
    New {
        value: Box<Node>,
    },

    // Literals
    Identifier {
        name: String,
    },
    Boolean {
        value: bool,
    },
    Integer {
        base: Base,
        digits: String,
    },
    Float {
        base: Base,
        digits: String,
    },
    Str {
        text: String,
        multi_line: bool,
    },
    Regex {
        pattern: String,
    },
    Symbol {
        name: String,
    },
    Coefficient {
        coefficient: Box<Node>,
        identifier: String,
    },
    List {
        elements: Vec<Node>,
    },
    Matrix {
        rows: Vec<Vec<Node>>,
    },
    Tuple {
        elements: Vec<Element>,
    },
    Dict {
        entries: Vec<DictEntry>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<RefKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub range: Range,
}

impl Node {
    pub fn new(kind: NodeKind, range: Range) -> Self {
        Self {
            kind,
            reference: None,
            annotation: None,
            range,
        }
    }

    pub fn with_reference(mut self, reference: Option<RefKind>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_annotation(mut self, annotation: Option<String>) -> Self {
        self.annotation = annotation;
        self
    }

    pub fn identifier(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Identifier { name } => Some(name),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::Module { .. } => "Module",
            NodeKind::Import { .. } => "Import",
            NodeKind::TypeDef { .. } => "TypeDef",
            NodeKind::EnumDef { .. } => "EnumDef",
            NodeKind::FunctionDef { .. } => "FunctionDef",
            NodeKind::PropertyDef { .. } => "PropertyDef",
            NodeKind::Subject { .. } => "Subject",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::Loop { .. } => "Loop",
            NodeKind::For { .. } => "For",
            NodeKind::Try { .. } => "Try",
            NodeKind::Defer { .. } => "Defer",
            NodeKind::Return { .. } => "Return",
            NodeKind::Yield { .. } => "Yield",
            NodeKind::Raise { .. } => "Raise",
            NodeKind::Break { .. } => "Break",
            NodeKind::Continue { .. } => "Continue",
            NodeKind::Fallthrough { .. } => "Fallthrough",
            NodeKind::Pass => "Pass",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::Infix { .. } => "Infix",
            NodeKind::PrefixAtom { .. } => "PrefixAtom",
            NodeKind::PostfixAtom { .. } => "PostfixAtom",
            NodeKind::Call { .. } => "Call",
            NodeKind::Dot { .. } => "Dot",
            NodeKind::Index { .. } => "Index",
            NodeKind::Slice { .. } => "Slice",
            NodeKind::Await { .. } => "Await",
            NodeKind::New { .. } => "New",
            NodeKind::Identifier { .. } => "Identifier",
            NodeKind::Boolean { .. } => "Boolean",
            NodeKind::Integer { .. } => "Integer",
            NodeKind::Float { .. } => "Float",
            NodeKind::Str { .. } => "Str",
            NodeKind::Regex { .. } => "Regex",
            NodeKind::Symbol { .. } => "Symbol",
            NodeKind::Coefficient { .. } => "Coefficient",
            NodeKind::List { .. } => "List",
            NodeKind::Matrix { .. } => "Matrix",
            NodeKind::Tuple { .. } => "Tuple",
            NodeKind::Dict { .. } => "Dict",
        }
    }

    /// Direct children in source order, including nodes nested inside
    /// parameters, clauses and collection entries.
    pub fn children(&self) -> Vec<&Node> {
        fn params(list: &[Parameter]) -> impl Iterator<Item = &Node> {
            list.iter().filter_map(|param| param.default.as_ref())
        }

        let mut out: Vec<&Node> = Vec::new();
        match &self.kind {
            NodeKind::Module { body, .. }
            | NodeKind::Loop { body }
            | NodeKind::Defer { body } => out.extend(body),
            NodeKind::TypeDef { fields, body, .. } => {
                out.extend(params(fields));
                out.extend(body);
            }
            NodeKind::EnumDef {
                fields, variants, ..
            } => {
                out.extend(params(fields));
                for variant in variants {
                    out.extend(params(&variant.fields));
                }
            }
            NodeKind::FunctionDef { params: list, body, .. } => {
                out.extend(params(list));
                out.extend(body);
            }
            NodeKind::PropertyDef { getter, setter, .. } => {
                out.extend(getter.as_deref());
                out.extend(setter.as_deref());
            }
            NodeKind::Subject { value, .. }
            | NodeKind::Return { value }
            | NodeKind::Yield { value, .. }
            | NodeKind::Raise { value }
            | NodeKind::Break { value, .. } => out.extend(value.as_deref()),
            NodeKind::If {
                condition,
                body,
                elifs,
                else_body,
            } => {
                out.push(condition);
                out.extend(body);
                for elif in elifs {
                    out.push(&elif.condition);
                    out.extend(&elif.body);
                }
                out.extend(else_body);
            }
            NodeKind::While { condition, body } => {
                out.push(condition);
                out.extend(body);
            }
            NodeKind::For { iterable, body, .. } => {
                out.push(iterable);
                out.extend(body);
            }
            NodeKind::Try {
                body,
                excepts,
                ensure,
            } => {
                out.extend(body);
                for clause in excepts {
                    out.extend(&clause.body);
                }
                out.extend(ensure);
            }
            NodeKind::Assignment { target, value, .. } => {
                out.push(target);
                out.push(value);
            }
            NodeKind::Infix { operands, .. } => out.extend(operands),
            NodeKind::PrefixAtom { operand, .. } | NodeKind::PostfixAtom { operand, .. } => {
                out.push(operand)
            }
            NodeKind::Call {
                callee, arguments, ..
            } => {
                out.push(callee);
                out.extend(arguments.iter().map(|arg| &arg.value));
            }
            NodeKind::Dot { object, .. } => out.push(object),
            NodeKind::Index { object, indices } => {
                out.push(object);
                out.extend(indices);
            }
            NodeKind::Slice { start, stop, step } => {
                out.extend(start.as_deref());
                out.extend(stop.as_deref());
                out.extend(step.as_deref());
            }
            NodeKind::Await { value } | NodeKind::New { value } => out.push(value),
            NodeKind::Coefficient { coefficient, .. } => out.push(coefficient),
            NodeKind::List { elements } => out.extend(elements),
            NodeKind::Matrix { rows } => out.extend(rows.iter().flatten()),
            NodeKind::Tuple { elements } => out.extend(elements.iter().map(|e| &e.value)),
            NodeKind::Dict { entries } => {
                for entry in entries {
                    out.push(&entry.key);
                    out.push(&entry.value);
                }
            }
            NodeKind::Import { .. }
            | NodeKind::Continue { .. }
            | NodeKind::Fallthrough { .. }
            | NodeKind::Pass
            | NodeKind::Identifier { .. }
            | NodeKind::Boolean { .. }
            | NodeKind::Integer { .. }
            | NodeKind::Float { .. }
            | NodeKind::Str { .. }
            | NodeKind::Regex { .. }
            | NodeKind::Symbol { .. } => {}
        }
        out
    }

    /// Depth-first walk over this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}

/// Root of a parsed source unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub body: Vec<Node>,
    pub range: Range,
}

impl Program {
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node)) {
        for node in &self.body {
            node.walk(visit);
        }
    }
}
