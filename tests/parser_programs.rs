//! Whole programs: declarations, control flow and indentation-sensitive
//! blocks.

use astro::astro::ast::{NodeKind, RefKind, SubjectKind};
use astro::astro::formats::to_treeviz_str;
use astro::astro::parsing::{parse_source, FrontendError};
use astro::astro::testing::{assert_ast, parse_ok};
use rstest::rstest;
use std::fs;

fn kinds(source: &str) -> Vec<&'static str> {
    parse_ok(source).body.iter().map(|node| node.kind_name()).collect()
}

fn parse_error(source: &str) -> String {
    match parse_source(source) {
        Ok(program) => panic!("expected an error, parsed {:?}", program),
        Err(err) => err.message().to_string(),
    }
}

#[test]
fn fixture_program() {
    let source = fs::read_to_string("tests/fixtures/shapes.astro").expect("fixture to exist");
    assert_eq!(
        kinds(&source),
        vec![
            "Module", "Import", "Import", "TypeDef", "EnumDef", "EnumDef", "FunctionDef",
            "FunctionDef", "FunctionDef", "Subject"
        ]
    );
    let tree = to_treeviz_str(&parse_ok(&source));
    assert!(tree.contains("FunctionDef: area(s)"), "{}", tree);
}

#[test]
fn statement_separators() {
    assert_eq!(kinds("a; b\n\nc;"), vec!["Identifier", "Identifier", "Identifier"]);
    assert_eq!(kinds("\n\n  \nx = 1\n\n"), vec!["Assignment"]);
    assert!(parse_ok("").body.is_empty());
}

#[test]
fn comments_are_ignored() {
    assert_eq!(kinds("a # first\n# whole line\nb #= inline =# "), vec!["Identifier", "Identifier"]);
}

#[test]
fn nested_blocks_close_together() {
    let program = parse_ok("if a\n    if b\n        c\nd");
    assert_eq!(program.body.len(), 2);
    assert_ast(&program)
        .statement(0, |outer| {
            outer.kind("If").child(1, |inner| {
                inner.kind("If").starts_at(2, 4).child_count(2);
            });
        })
        .statement(1, |d| {
            d.identifier("d").starts_at(4, 0);
        });
}

#[test]
fn if_elif_else() {
    let program = parse_ok("if a\n    x\nelif b\n    y\nelif c: z\nelse\n    w");
    let NodeKind::If {
        elifs, else_body, ..
    } = &program.body[0].kind
    else {
        panic!("expected an if");
    };
    assert_eq!(elifs.len(), 2);
    assert_eq!(else_body.len(), 1);
}

#[test]
fn inline_bodies() {
    assert_eq!(
        kinds("if ok: go()\nwhile busy: wait()\nloop: pass\ndefer: close(f)"),
        vec!["If", "While", "Loop", "Defer"]
    );
}

#[test]
fn for_loop_targets() {
    let program = parse_ok("for k, v in pairs(d)\n    print(k)");
    let NodeKind::For { targets, .. } = &program.body[0].kind else {
        panic!("expected a for loop");
    };
    assert_eq!(targets, &["k".to_string(), "v".to_string()]);
}

#[test]
fn try_except_ensure() {
    let program = parse_ok(
        "try\n    risky()\nexcept IOError as e\n    log(e)\nexcept\n    pass\nensure\n    close()",
    );
    let NodeKind::Try {
        excepts, ensure, ..
    } = &program.body[0].kind
    else {
        panic!("expected a try");
    };
    assert_eq!(excepts[0].error.as_deref(), Some("IOError"));
    assert_eq!(excepts[0].binding.as_deref(), Some("e"));
    assert_eq!(excepts[1].error, None);
    assert_eq!(ensure.len(), 1);
}

#[rstest(
    source,
    kind,
    case("return", "Return"),
    case("return x + 1", "Return"),
    case("yield x", "Yield"),
    case("yield from gen()", "Yield"),
    case("raise Error('boom')", "Raise"),
    case("break", "Break"),
    case("break @outer", "Break"),
    case("continue @outer", "Continue"),
    case("fallthrough", "Fallthrough"),
    case("pass", "Pass")
)]
fn control_primitives(source: &str, kind: &str) {
    assert_ast(&parse_ok(source)).statement(0, |s| {
        s.kind(kind);
    });
}

#[test]
fn break_with_value_and_label() {
    let program = parse_ok("break total @outer");
    let NodeKind::Break { value, label } = &program.body[0].kind else {
        panic!("expected a break");
    };
    assert_eq!(value.as_ref().and_then(|v| v.identifier()), Some("total"));
    assert_eq!(label.as_deref(), Some("outer"));
}

#[test]
fn functions() {
    let program = parse_ok("fun scale(ref v: Vector, *factors, k = 2) -> Vector\n    return v");
    let NodeKind::FunctionDef {
        name,
        params,
        returns,
        body,
    } = &program.body[0].kind
    else {
        panic!("expected a function");
    };
    assert_eq!(name, "scale");
    assert_eq!(params[0].reference, Some(RefKind::Reference));
    assert_eq!(params[0].annotation.as_deref(), Some("Vector"));
    assert_eq!(params[1].sigil.as_deref(), Some("*"));
    assert!(params[2].default.is_some());
    assert_eq!(returns.as_deref(), Some("Vector"));
    assert_eq!(body.len(), 1);
}

#[test]
fn expression_bodied_function() {
    assert_ast(&parse_ok("fun sq(x) = x * x")).statement(0, |s| {
        s.kind("FunctionDef").child_count(1).child(0, |body| {
            body.kind("Infix").operators(&["*"]);
        });
    });
}

#[test]
fn imports() {
    let program = parse_ok("import math.linalg as la\nfrom os import path, sep as s");
    let NodeKind::Import { module, alias, .. } = &program.body[0].kind else {
        panic!("expected an import");
    };
    assert_eq!((module.as_str(), alias.as_deref()), ("math.linalg", Some("la")));

    let NodeKind::Import { names, .. } = &program.body[1].kind else {
        panic!("expected an import");
    };
    let names: Vec<_> = names
        .iter()
        .map(|n| (n.name.as_str(), n.alias.as_deref()))
        .collect();
    assert_eq!(names, vec![("path", None), ("sep", Some("s"))]);
}

#[test]
fn modules_with_and_without_body() {
    assert_ast(&parse_ok("module geo\n    let pi = 3.14\n    fun tau() = 2 * pi\nmodule a.b"))
        .statement_count(2)
        .statement(0, |m| {
            m.kind("Module").child_count(2);
        })
        .statement(1, |m| {
            m.kind("Module").child_count(0);
        });
}

#[test]
fn types() {
    let program = parse_ok(
        "type Point(x: Float, y: Float = 0.0) <: Shape, Printable\ntype Counter\n    var count = 0\n    fun value() = count",
    );
    let NodeKind::TypeDef {
        fields, parents, ..
    } = &program.body[0].kind
    else {
        panic!("expected a type");
    };
    assert_eq!(fields.len(), 2);
    assert_eq!(parents, &["Shape".to_string(), "Printable".to_string()]);

    let NodeKind::TypeDef { body, .. } = &program.body[1].kind else {
        panic!("expected a type");
    };
    assert_eq!(body.len(), 2);
}

#[test]
fn annotations_keep_their_surface_form() {
    let program = parse_ok("let xs: List[Map[Str, Int]]? = none");
    assert_eq!(
        program.body[0].annotation.as_deref(),
        Some("List[Map[Str, Int]]?")
    );
}

#[rstest]
#[case("enum Color: Red, Green, Blue", 3)]
#[case("enum Shape\n    Circle(r: Float)\n    Square(side: Float), Dot", 3)]
#[case("enum Bit\n    Zero, One\n", 2)]
fn enums(#[case] source: &str, #[case] count: usize) {
    let program = parse_ok(source);
    let NodeKind::EnumDef { variants, .. } = &program.body[0].kind else {
        panic!("expected an enum");
    };
    assert_eq!(variants.len(), count);
}

#[test]
fn properties() {
    let program = parse_ok("prop area: Float\n    get = w * h\n    set(v)\n        w = v / h\nx");
    assert_eq!(program.body.len(), 2);
    let node = &program.body[0];
    assert_eq!(node.annotation.as_deref(), Some("Float"));
    let NodeKind::PropertyDef { getter, setter, .. } = &node.kind else {
        panic!("expected a property");
    };
    assert!(getter.is_some());
    assert!(setter.is_some());
}

#[test]
fn subjects() {
    let program = parse_ok("let val p: Point = origin\nvar n\nconst limit = 10");
    let subjects: Vec<_> = program
        .body
        .iter()
        .map(|node| match &node.kind {
            NodeKind::Subject { kind, value, .. } => (*kind, value.is_some()),
            other => panic!("expected a subject, found {:?}", other),
        })
        .collect();
    assert_eq!(
        subjects,
        vec![
            (SubjectKind::Let, true),
            (SubjectKind::Var, false),
            (SubjectKind::Const, true)
        ]
    );
    assert_eq!(program.body[0].reference, Some(RefKind::Value));
    assert_eq!(program.body[0].annotation.as_deref(), Some("Point"));
}

#[rstest]
#[case("try\n    a\n", "`try` needs an `except` or `ensure` clause")]
#[case("const limit", "`const` binding `limit` must be initialized")]
#[case("let x", "`let` binding `x` must be initialized")]
#[case("fun f(* a) = 1", "no space allowed between `*` and the parameter name")]
#[case("fun f()", "function `f` needs `= expression` or an indented body")]
#[case("enum E", "enum `E` needs at least one variant")]
#[case("type T(a)\n    pass", "type `T` cannot have both a field list and a body")]
#[case("prop p\n    get = 1\n    get = 2", "property `p` defines an accessor twice")]
#[case("from m import", "expected names to import from `m`")]
#[case("if a", "expected a block or `:` after the `if` condition")]
#[case("x = 1\n    y = 2", "unexpected indent")]
fn committed_constructs_fail_loudly(#[case] source: &str, #[case] message: &str) {
    let actual = parse_error(source);
    assert!(
        actual.contains(message),
        "expected {:?} in {:?}",
        message,
        actual
    );
}

#[test]
fn lex_errors_surface_through_the_front_end() {
    let err = parse_source("if a\n    b\nif c\n\td").unwrap_err();
    assert!(matches!(err, FrontendError::Lex(_)));
    assert_eq!(err.position().line, 4);
}

#[test]
fn program_range_covers_every_statement() {
    let program = parse_ok("\n\nfirst()\nlast()\n");
    assert_eq!(program.range.start.line, 3);
    assert_eq!(program.range.end.line, 4);
}
