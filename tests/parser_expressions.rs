//! Expression parsing: flat infix runs, prefix/postfix atoms, chains and
//! literal atoms.

use astro::astro::ast::{NodeKind, RefKind};
use astro::astro::parsing::parse_source;
use astro::astro::testing::{assert_ast, parse_ok};
use rstest::rstest;

#[rstest]
#[case("a + b", &["+"])]
#[case("a+b", &["+"])]
#[case("a + b * c - d", &["+", "*", "-"])]
#[case("a .+ b", &[".+"])]
#[case("a is b", &["is"])]
#[case("a is not b", &["is not"])]
#[case("a in b", &["in"])]
#[case("a not in b", &["not in"])]
#[case("n mod 2 == 0", &["mod", "=="])]
#[case("a ≠ b", &["≠"])]
fn infix_runs_stay_flat(#[case] source: &str, #[case] operators: &[&str]) {
    assert_ast(&parse_ok(source))
        .statement_count(1)
        .statement(0, |s| {
            s.kind("Infix")
                .operators(operators)
                .child_count(operators.len() + 1);
        });
}

#[test]
fn postfix_operator_before_keyword_operator() {
    assert_ast(&parse_ok("1 - d+ in b")).statement(0, |s| {
        s.kind("Infix")
            .operators(&["-", "in"])
            .child(0, |one| {
                one.kind("Integer");
            })
            .child(1, |d| {
                d.kind("PostfixAtom").child(0, |inner| {
                    inner.identifier("d");
                });
            })
            .child(2, |b| {
                b.identifier("b");
            });
    });
}

#[rstest(
    source,
    kind,
    case("-x", "PrefixAtom"),
    case("not done", "PrefixAtom"),
    case("n!", "PostfixAtom"),
    case("f(n!)", "Call"),
    case("x", "Identifier"),
    case("$red", "Symbol"),
    case("78f", "Coefficient"),
    case("true", "Boolean"),
    case("0x1F", "Integer"),
    case(".5", "Float"),
    case("'text'", "Str"),
    case("[1, 2, 3]", "List"),
    case("[1, 2; 3, 4]", "Matrix"),
    case("[1, 2;]", "List"),
    case("()", "Tuple"),
    case("(1, 2)", "Tuple"),
    case("(1,)", "Tuple"),
    case("(x: 1)", "Tuple"),
    case("{a: 1, b}", "Dict"),
    case("await fetch(url)", "Await"),
    case("new Point(1, 2)", "New")
)]
fn operand_shapes(source: &str, kind: &str) {
    assert_ast(&parse_ok(source)).statement_count(1).statement(0, |s| {
        s.kind(kind);
    });
}

#[test]
fn parenthesized_group_keeps_the_inner_node() {
    assert_ast(&parse_ok("(a + b)")).statement(0, |s| {
        let node = s.node();
        assert_eq!(node.range.start.column, 0);
        assert_eq!(node.range.end.column, 7);
        s.kind("Infix").operators(&["+"]);
    });
}

#[test]
fn chains_nest_left_to_right() {
    assert_ast(&parse_ok("a.b(c)[0]")).statement(0, |s| {
        s.kind("Index").child(0, |call| {
            call.kind("Call").child(0, |dot| {
                dot.kind("Dot").child(0, |a| {
                    a.identifier("a");
                });
            });
        });
    });
}

#[test]
fn spaced_paren_is_not_a_call() {
    let err = parse_source("f (x)").unwrap_err();
    assert!(err.message().starts_with("unexpected `(`"), "{}", err);
}

#[test]
fn vectorized_call() {
    let program = parse_ok("sin.(xs)");
    let NodeKind::Call { vectorized, .. } = &program.body[0].kind else {
        panic!("expected a call, found {:?}", program.body[0].kind);
    };
    assert!(vectorized);
}

#[rstest]
#[case("xs[1:2]", (true, true, false))]
#[case("xs[:2]", (false, true, false))]
#[case("xs[1:]", (true, false, false))]
#[case("xs[::2]", (false, false, true))]
fn slices(#[case] source: &str, #[case] parts: (bool, bool, bool)) {
    let program = parse_ok(source);
    let NodeKind::Index { indices, .. } = &program.body[0].kind else {
        panic!("expected an index, found {:?}", program.body[0].kind);
    };
    let NodeKind::Slice { start, stop, step } = &indices[0].kind else {
        panic!("expected a slice, found {:?}", indices[0].kind);
    };
    assert_eq!((start.is_some(), stop.is_some(), step.is_some()), parts);
}

#[test]
fn reference_kind_widens_the_chain() {
    assert_ast(&parse_ok("f(iso buffer)")).statement(0, |s| {
        s.kind("Call").child(1, |arg| {
            arg.identifier("buffer")
                .reference(RefKind::Isolated)
                .starts_at(1, 2);
        });
    });
}

#[test]
fn dict_shorthand_repeats_the_key() {
    let program = parse_ok("{name}");
    let NodeKind::Dict { entries } = &program.body[0].kind else {
        panic!("expected a dict");
    };
    assert_eq!(entries[0].key, entries[0].value);
}

#[test]
fn labelled_call_arguments() {
    let program = parse_ok("plot(xs, color: 'red')");
    let NodeKind::Call { arguments, .. } = &program.body[0].kind else {
        panic!("expected a call");
    };
    let labels: Vec<_> = arguments.iter().map(|a| a.label.as_deref()).collect();
    assert_eq!(labels, vec![None, Some("color")]);
}

#[test]
fn matrix_rows() {
    let program = parse_ok("[1, 2; 3, 4; 5, 6]");
    let NodeKind::Matrix { rows } = &program.body[0].kind else {
        panic!("expected a matrix");
    };
    assert_eq!(rows.iter().map(Vec::len).collect::<Vec<_>>(), vec![2, 2, 2]);
}

#[rstest]
#[case("x = 1", "=")]
#[case("x += 1", "+=")]
#[case("x <<= 2", "<<=")]
#[case("p.x = 3", "=")]
#[case("xs[0] = /a+/", "=")]
fn assignments(#[case] source: &str, #[case] operator: &str) {
    let program = parse_ok(source);
    let NodeKind::Assignment { operator: actual, .. } = &program.body[0].kind else {
        panic!("expected an assignment, found {:?}", program.body[0].kind);
    };
    assert_eq!(actual, operator);
}

#[rstest]
#[case("a <= b")]
#[case("a >= b")]
#[case("a != b")]
#[case("a == b")]
fn comparisons_are_not_assignments(#[case] source: &str) {
    assert_ast(&parse_ok(source)).statement(0, |s| {
        s.kind("Infix");
    });
}

#[rstest]
#[case("f(1, 2", "expected `)` to close the argument list")]
#[case("[1, 2", "expected `]` to close the list")]
#[case("x = ", "expected an expression after `=`")]
#[case("$ x", "expected a symbol name directly after `$`")]
fn unclosed_and_incomplete(#[case] source: &str, #[case] message: &str) {
    let err = parse_source(source).unwrap_err();
    assert!(
        err.message().contains(message),
        "expected {:?} in {:?}",
        message,
        err.message()
    );
}

#[test]
fn stray_token_reports_its_position() {
    let err = parse_source("a b").unwrap_err();
    assert!(err.message().starts_with("unexpected `b`"), "{}", err);
    assert_eq!((err.position().line, err.position().column), (1, 2));
}
