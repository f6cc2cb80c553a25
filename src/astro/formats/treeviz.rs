//! Treeviz formatter for syntax trees
//!
//! One line per node, with box-drawing connectors encoding the nesting:
//!
//! ```text
//! ├─ FunctionDef: sq(x)
//! │ └─ Infix: *
//! │   ├─ Identifier: x
//! │   └─ Identifier: x
//! └─ Return
//! ```
//!
//! Labels are truncated to 30 characters.

use crate::astro::ast::nodes::{Node, NodeKind, OperatorDescriptor, Program};

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let mut truncated = s.chars().take(max_chars).collect::<String>();
        truncated.push_str("...");
        truncated
    } else {
        s.to_string()
    }
}

fn operator_label(descriptor: &OperatorDescriptor) -> String {
    let dot = if descriptor.vectorized { "." } else { "" };
    format!("{}{}", dot, descriptor.operator.text())
}

fn display_label(node: &Node) -> String {
    match &node.kind {
        NodeKind::Module { name, .. }
        | NodeKind::TypeDef { name, .. }
        | NodeKind::EnumDef { name, .. }
        | NodeKind::PropertyDef { name, .. }
        | NodeKind::Identifier { name }
        | NodeKind::Symbol { name } => name.clone(),
        NodeKind::Import { module, names, .. } if !names.is_empty() => {
            let names: Vec<&str> = names.iter().map(|n| n.name.as_str()).collect();
            format!("{}: {}", module, names.join(", "))
        }
        NodeKind::Import { module, .. } => module.clone(),
        NodeKind::FunctionDef { name, params, .. } => {
            let params: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
            format!("{}({})", name, params.join(", "))
        }
        NodeKind::Subject { kind, name, .. } => {
            format!("{} {}", format!("{:?}", kind).to_lowercase(), name)
        }
        NodeKind::For { targets, .. } => targets.join(", "),
        NodeKind::Break { label, .. }
        | NodeKind::Continue { label }
        | NodeKind::Fallthrough { label } => label
            .as_ref()
            .map(|l| format!("@{}", l))
            .unwrap_or_default(),
        NodeKind::Yield { from: true, .. } => "from".to_string(),
        NodeKind::Assignment { operator, .. } => operator.clone(),
        NodeKind::Infix { operators, .. } => operators
            .iter()
            .map(operator_label)
            .collect::<Vec<_>>()
            .join(" "),
        NodeKind::PrefixAtom { operator, .. } | NodeKind::PostfixAtom { operator, .. } => {
            operator_label(operator)
        }
        NodeKind::Call { vectorized, .. } if *vectorized => ".()".to_string(),
        NodeKind::Dot { field, .. } => format!(".{}", field),
        NodeKind::Boolean { value } => value.to_string(),
        NodeKind::Integer { base, digits } | NodeKind::Float { base, digits } => {
            format!("{}{}", base.prefix(), digits)
        }
        NodeKind::Str { text, .. } => format!("{:?}", text),
        NodeKind::Regex { pattern } => format!("/{}/", pattern),
        NodeKind::Coefficient { identifier, .. } => identifier.clone(),
        NodeKind::List { elements } => format!("{} items", elements.len()),
        NodeKind::Matrix { rows } => format!("{} rows", rows.len()),
        NodeKind::Tuple { elements } => format!("{} items", elements.len()),
        NodeKind::Dict { entries } => format!("{} entries", entries.len()),
        _ => String::new(),
    }
}

pub fn to_treeviz_str(program: &Program) -> String {
    let mut result = String::new();
    let nodes: Vec<&Node> = program.body.iter().collect();
    append_children(&mut result, &nodes, "");
    result
}

fn append_node(result: &mut String, node: &Node, prefix: &str, is_last: bool) {
    let connector = if is_last { "└─" } else { "├─" };
    let label = truncate(&display_label(node), 30);
    if label.is_empty() {
        result.push_str(&format!("{}{} {}\n", prefix, connector, node.kind_name()));
    } else {
        result.push_str(&format!(
            "{}{} {}: {}\n",
            prefix,
            connector,
            node.kind_name(),
            label
        ));
    }

    let new_prefix = format!("{}{}", prefix, if is_last { "  " } else { "│ " });
    append_children(result, &node.children(), &new_prefix);
}

fn append_children(result: &mut String, children: &[&Node], prefix: &str) {
    for (i, child) in children.iter().enumerate() {
        let is_last = i == children.len() - 1;
        append_node(result, child, prefix, is_last);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::astro::parsing::parse_source;

    #[test]
    fn test_function_tree() {
        let program = parse_source("fun sq(x) = x * x\nreturn").unwrap();
        insta::assert_snapshot!(to_treeviz_str(&program), @r###"
        ├─ FunctionDef: sq(x)
        │ └─ Infix: *
        │   ├─ Identifier: x
        │   └─ Identifier: x
        └─ Return
        "###);
    }

    #[test]
    fn test_labels_are_truncated() {
        let program = parse_source("'a very long string literal that keeps going'").unwrap();
        let tree = to_treeviz_str(&program);
        assert!(tree.starts_with("└─ Str: \"a very long string literal th..."));
    }
}
