//! Declarations
//!
//! Every declaration starts with its keyword. Once the keyword and the
//! declared name have been read the construct is identified, and a
//! malformed remainder is a fatal error rather than a reason to try the
//! next alternative.

use super::engine::{ParseResult, Parser, Rule};
use super::error::ParseError;
use super::layout;
use super::literals::identifier_name;
use super::operators::{expression, ref_kind};
use crate::astro::ast::nodes::{ImportName, Node, NodeKind, Parameter, SubjectKind, Variant};
use crate::astro::lexing::tokens::TokenKind;

/// Operators allowed directly before a parameter name.
const PARAMETER_SIGILS: [&str; 3] = ["*", "**", "&"];

pub fn declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let rules: [Rule<'_, Node>; 7] = [
        module_declaration as Rule<'_, Node>,
        import_declaration as Rule<'_, Node>,
        type_declaration as Rule<'_, Node>,
        enum_declaration as Rule<'_, Node>,
        function_declaration as Rule<'_, Node>,
        property_declaration as Rule<'_, Node>,
        subject_declaration as Rule<'_, Node>,
    ];
    p.alt(&rules)
}

fn dotted_part(p: &mut Parser<'_>) -> ParseResult<String> {
    p.attempt(|p| {
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        let Some(_) = p.literal(".")? else {
            return Ok(None);
        };
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        identifier_name(p)
    })
}

/// `a.b.c`, with no spaces around the dots.
pub fn dotted_name(p: &mut Parser<'_>) -> ParseResult<String> {
    let Some(mut name) = identifier_name(p)? else {
        return Ok(None);
    };
    for part in p.optmore(dotted_part)? {
        name.push('.');
        name.push_str(&part);
    }
    Ok(Some(name))
}

fn optional_marker(p: &mut Parser<'_>) -> ParseResult<()> {
    p.attempt(|p| {
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        Ok(p.literal("?")?.map(|_| ()))
    })
}

fn annotation_arguments(p: &mut Parser<'_>) -> ParseResult<Vec<String>> {
    p.attempt(|p| {
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        let Some(_) = p.literal("[")? else {
            return Ok(None);
        };
        let arguments = p.separated(annotation, ",")?;
        p.required(|p| p.literal("]"), "expected `]` to close the type arguments")?;
        Ok(Some(arguments))
    })
}

/// A type annotation, kept as normalized surface text: `List[Int]?`.
pub fn annotation(p: &mut Parser<'_>) -> ParseResult<String> {
    let Some(mut text) = dotted_name(p)? else {
        return Ok(None);
    };
    if let Some(arguments) = p.opt(annotation_arguments)? {
        text.push('[');
        text.push_str(&arguments.join(", "));
        text.push(']');
    }
    if p.opt(optional_marker)?.is_some() {
        text.push('?');
    }
    Ok(Some(text))
}

/// `: annotation`
fn type_annotation(p: &mut Parser<'_>) -> ParseResult<String> {
    let Some(_) = p.literal(":")? else {
        return Ok(None);
    };
    Ok(Some(p.required(annotation, "expected a type after `:`")?))
}

/// `= expression`
fn initializer(p: &mut Parser<'_>) -> ParseResult<Node> {
    let Some(_) = p.literal("=")? else {
        return Ok(None);
    };
    Ok(Some(p.required(expression, "expected an expression after `=`")?))
}

pub fn parameter(p: &mut Parser<'_>) -> ParseResult<Parameter> {
    p.attempt(|p| {
        let start = p.start();
        let reference = p.opt(ref_kind)?;
        let sigil = match p.token_if("a parameter sigil", |t| {
            t.kind == TokenKind::Operator && PARAMETER_SIGILS.contains(&t.text())
        })? {
            Some(token) => {
                if p.no_space()?.is_none() {
                    return Err(p.error_here(format!(
                        "no space allowed between `{}` and the parameter name",
                        token.text()
                    )));
                }
                Some(token.text().to_string())
            }
            None => None,
        };
        let name = match sigil {
            Some(_) => p.required(identifier_name, "expected a parameter name")?,
            None => match identifier_name(p)? {
                Some(name) => name,
                None => return Ok(None),
            },
        };
        let annotation = p.opt(type_annotation)?;
        let default = p.opt(initializer)?;
        Ok(Some(Parameter {
            name,
            sigil,
            reference,
            annotation,
            default,
            range: p.range_from(start),
        }))
    })
}

/// `( parameter, … )`
pub fn field_list(p: &mut Parser<'_>) -> ParseResult<Vec<Parameter>> {
    let Some(_) = p.literal("(")? else {
        return Ok(None);
    };
    let fields = p.separated(parameter, ",")?;
    p.required(|p| p.literal(")"), "expected `)` to close the parameter list")?;
    Ok(Some(fields))
}

fn module_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("module")? else {
        return Ok(None);
    };
    let name = p.required(dotted_name, "expected a module name after `module`")?;
    let body = if p.at(TokenKind::Indent) {
        p.required(
            layout::block,
            format!("expected statements in the body of module `{}`", name),
        )?
    } else {
        Vec::new()
    };
    Ok(Some(p.node(NodeKind::Module { name, body }, start)))
}

fn alias(p: &mut Parser<'_>) -> ParseResult<String> {
    let Some(_) = p.literal("as")? else {
        return Ok(None);
    };
    Ok(Some(p.required(identifier_name, "expected a name after `as`")?))
}

fn import_name(p: &mut Parser<'_>) -> ParseResult<ImportName> {
    let Some(name) = identifier_name(p)? else {
        return Ok(None);
    };
    let alias = p.opt(alias)?;
    Ok(Some(ImportName { name, alias }))
}

fn import_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    if p.literal("import")?.is_some() {
        let module = p.required(dotted_name, "expected a module name after `import`")?;
        let alias = p.opt(alias)?;
        return Ok(Some(p.node(
            NodeKind::Import {
                module,
                alias,
                names: Vec::new(),
            },
            start,
        )));
    }
    let Some(_) = p.literal("from")? else {
        return Ok(None);
    };
    let module = p.required(dotted_name, "expected a module name after `from`")?;
    p.required(
        |p| p.literal("import"),
        format!("expected `import` after `from {}`", module),
    )?;
    let names = p.separated(import_name, ",")?;
    if names.is_empty() {
        return Err(p.error_here(format!("expected names to import from `{}`", module)));
    }
    Ok(Some(p.node(
        NodeKind::Import {
            module,
            alias: None,
            names,
        },
        start,
    )))
}

/// `<: Parent, Other`
fn parent_list(p: &mut Parser<'_>) -> ParseResult<Vec<String>> {
    p.attempt(|p| {
        let Some(_) = p.literal("<")? else {
            return Ok(None);
        };
        let Some(()) = p.no_space()? else {
            return Ok(None);
        };
        let Some(_) = p.literal(":")? else {
            return Ok(None);
        };
        let parents = p.separated(dotted_name, ",")?;
        if parents.is_empty() {
            return Err(p.error_here("expected a parent type after `<:`"));
        }
        Ok(Some(parents))
    })
}

fn type_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("type")? else {
        return Ok(None);
    };
    let name = p.required(identifier_name, "expected a type name after `type`")?;
    let fields = p.opt(field_list)?;
    let parents = p.opt(parent_list)?.unwrap_or_default();
    if fields.is_some() && p.at(TokenKind::Indent) {
        return Err(p.error_here(format!(
            "type `{}` cannot have both a field list and a body",
            name
        )));
    }
    let body = match p.at(TokenKind::Indent) {
        true => p.required(
            layout::block,
            format!("expected statements in the body of type `{}`", name),
        )?,
        false => Vec::new(),
    };
    Ok(Some(p.node(
        NodeKind::TypeDef {
            name,
            fields: fields.unwrap_or_default(),
            parents,
            body,
        },
        start,
    )))
}

fn variant(p: &mut Parser<'_>) -> ParseResult<Variant> {
    let start = p.start();
    let Some(name) = identifier_name(p)? else {
        return Ok(None);
    };
    let fields = p.opt(field_list)?.unwrap_or_default();
    Ok(Some(Variant {
        name,
        fields,
        range: p.range_from(start),
    }))
}

/// Variants on indented lines, separated by newlines or commas.
fn variant_block(p: &mut Parser<'_>) -> ParseResult<Vec<Variant>> {
    p.attempt(|p| {
        let Some(()) = layout::indent(p)? else {
            return Ok(None);
        };
        let mut variants = p.separated(variant, ",")?;
        if variants.is_empty() {
            return Ok(None);
        }
        loop {
            let checkpoint = p.snapshot();
            if p.more(layout::separator)?.is_none() {
                break;
            }
            let more = p.separated(variant, ",")?;
            if more.is_empty() {
                p.restore(checkpoint);
                break;
            }
            variants.extend(more);
        }
        p.optmore(layout::separator)?;
        let Some(()) = layout::dedent_or_eoi(p)? else {
            return Ok(None);
        };
        Ok(Some(variants))
    })
}

/// `: A, B, C` on the enum's own line.
fn inline_variants(p: &mut Parser<'_>) -> ParseResult<Vec<Variant>> {
    let Some(_) = p.literal(":")? else {
        return Ok(None);
    };
    let variants = p.separated(variant, ",")?;
    Ok((!variants.is_empty()).then_some(variants))
}

fn enum_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("enum")? else {
        return Ok(None);
    };
    let name = p.required(identifier_name, "expected an enum name after `enum`")?;
    let fields = p.opt(field_list)?.unwrap_or_default();
    let variants = p.required(
        |p| {
            let shapes: [Rule<'_, Vec<Variant>>; 2] = [variant_block as Rule<'_, Vec<Variant>>, inline_variants as Rule<'_, Vec<Variant>>];
            p.alt(&shapes)
        },
        format!("enum `{}` needs at least one variant", name),
    )?;
    Ok(Some(p.node(
        NodeKind::EnumDef {
            name,
            fields,
            variants,
        },
        start,
    )))
}

/// `= expression` or an indented block.
fn function_body(p: &mut Parser<'_>) -> ParseResult<Vec<Node>> {
    if let Some(value) = p.opt(initializer)? {
        return Ok(Some(vec![value]));
    }
    layout::block(p)
}

fn return_annotation(p: &mut Parser<'_>) -> ParseResult<String> {
    let Some(_) = p.literal("->")? else {
        return Ok(None);
    };
    Ok(Some(p.required(annotation, "expected a return type after `->`")?))
}

fn function_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("fun")? else {
        return Ok(None);
    };
    let name = p.required(identifier_name, "expected a function name after `fun`")?;
    p.required(
        |p| p.no_space(),
        format!("expected `(` directly after function name `{}`", name),
    )?;
    let params = p.required(
        field_list,
        format!("expected a parameter list after function name `{}`", name),
    )?;
    let returns = p.opt(return_annotation)?;
    let body = p.required(
        function_body,
        format!("function `{}` needs `= expression` or an indented body", name),
    )?;
    Ok(Some(p.node(
        NodeKind::FunctionDef {
            name,
            params,
            returns,
            body,
        },
        start,
    )))
}

/// `get …` or `set(value) …` inside a property block.
fn accessor(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(keyword) = p.token_if("`get` or `set`", |t| {
        t.kind == TokenKind::Identifier && matches!(t.text(), "get" | "set")
    })?
    else {
        return Ok(None);
    };
    let name = keyword.text().to_string();
    let params = p.opt(field_list)?.unwrap_or_default();
    let body = p.required(
        function_body,
        format!("accessor `{}` needs `= expression` or an indented body", name),
    )?;
    Ok(Some(p.node(
        NodeKind::FunctionDef {
            name,
            params,
            returns: None,
            body,
        },
        start,
    )))
}

fn next_accessor(p: &mut Parser<'_>) -> ParseResult<Node> {
    p.attempt(|p| {
        let Some(()) = layout::statement_end(p)? else {
            return Ok(None);
        };
        let Some(()) = layout::samedent(p)? else {
            return Ok(None);
        };
        accessor(p)
    })
}

fn property_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(_) = p.literal("prop")? else {
        return Ok(None);
    };
    let name = p.required(identifier_name, "expected a property name after `prop`")?;
    let annotation = p.opt(type_annotation)?;
    p.required(
        layout::indent,
        format!("property `{}` needs an indented block of accessors", name),
    )?;
    let first = p.required(
        accessor,
        format!("property `{}` needs a `get` or `set` accessor", name),
    )?;
    let mut accessors = vec![first];
    accessors.extend(p.optmore(next_accessor)?);
    p.optmore(layout::separator)?;
    p.required(
        layout::dedent_or_eoi,
        format!("expected the end of property `{}`", name),
    )?;

    let mut getter = None;
    let mut setter = None;
    for accessor in accessors {
        let slot = match &accessor.kind {
            NodeKind::FunctionDef { name, .. } if name == "get" => &mut getter,
            _ => &mut setter,
        };
        if slot.is_some() {
            return Err(ParseError::new(
                accessor.range.start,
                format!("property `{}` defines an accessor twice", name),
            ));
        }
        *slot = Some(Box::new(accessor));
    }

    Ok(Some(
        p.node(
            NodeKind::PropertyDef {
                name,
                getter,
                setter,
            },
            start,
        )
        .with_annotation(annotation),
    ))
}

fn subject_declaration(p: &mut Parser<'_>) -> ParseResult<Node> {
    let start = p.start();
    let Some(keyword) = p.token_if("`let`, `var` or `const`", |t| {
        t.kind == TokenKind::Keyword && matches!(t.text(), "let" | "var" | "const")
    })?
    else {
        return Ok(None);
    };
    let kind = match keyword.text() {
        "let" => SubjectKind::Let,
        "var" => SubjectKind::Var,
        _ => SubjectKind::Const,
    };
    let reference = p.opt(ref_kind)?;
    let name = p.required(
        identifier_name,
        format!("expected a name after `{}`", keyword.text()),
    )?;
    let annotation = p.opt(type_annotation)?;
    let value = p.opt(initializer)?;
    if value.is_none() && kind.is_constant() {
        return Err(p.error_here(format!(
            "`{}` binding `{}` must be initialized",
            keyword.text(),
            name
        )));
    }
    Ok(Some(
        p.node(
            NodeKind::Subject {
                kind,
                name,
                value: value.map(Box::new),
            },
            start,
        )
        .with_reference(reference)
        .with_annotation(annotation),
    ))
}
