//! Instruction-level checks of the translator output and its diagnostics

use pretty_assertions::assert_eq;
use rsrcc_codegen::{AsmInst, Imm, Reg, Shift};
use rsrcc_common::CompilerError;
use rsrcc_frontend::parser::MAX_NESTING_DEPTH;
use rsrcc_frontend::{Frontend, Scanner, Translator};
use std::thread;

use AsmInst::*;
use Reg::{Bp, Link, Primary as P, Ret, Secondary as S, Sp, Target, Zero};

fn translate(source: &str) -> Result<Vec<AsmInst>, CompilerError> {
    let mut sink = Vec::new();
    Frontend::translate(source, "test.src", &mut sink)?;
    Ok(sink)
}

fn translate_err(source: &str) -> (CompilerError, Vec<AsmInst>) {
    let mut sink = Vec::new();
    let err = Frontend::translate(source, "test.src", &mut sink).unwrap_err();
    (err, sink)
}

fn expression(source: &str) -> Vec<AsmInst> {
    let mut sink = Vec::new();
    let mut translator = Translator::new(Scanner::new(source, "expr"), &mut sink);
    translator.translate_expression().unwrap();
    sink
}

fn label(name: &str) -> Imm {
    Imm::Label(name.to_string())
}

fn push() -> Vec<AsmInst> {
    vec![Store(P, 0.into(), Sp), AddI(Sp, Sp, -4)]
}

fn pop() -> Vec<AsmInst> {
    vec![AddI(Sp, Sp, 4), Load(S, 0.into(), Sp)]
}

fn posted_labels(code: &[AsmInst]) -> Vec<String> {
    code.iter()
        .filter_map(|inst| match inst {
            Label(l) | Word(l) => Some(l.clone()),
            _ => None,
        })
        .collect()
}

#[test]
fn test_global_and_main_translation() {
    let code = translate("var x = 5; function main() { var y = x + 1; return (y); }").unwrap();

    let mut expected = vec![
        // global x
        La(Target, label("L1")),
        Br(Target),
        Word("GL0".to_string()),
        Label("L1".to_string()),
        La(P, 5.into()),
        Store(P, label("GL0"), Zero),
        // entry sequence
        Comment("program entry".to_string()),
        AddI(Sp, Sp, -4),
        Store(Bp, 0.into(), Sp),
        AddI(Sp, Sp, -4),
        AddI(Bp, Sp, 4),
        La(Target, label("main")),
        Brl(Link, Target),
        Load(Bp, 0.into(), Bp),
        AddI(Sp, Sp, 8),
        Add(P, Ret, Zero),
        Stop,
        // function main
        Comment("function main".to_string()),
        Label("main".to_string()),
        Store(Link, 4.into(), Bp),
        AddI(Sp, Sp, -4),
        Load(P, label("GL0"), Zero),
    ];
    expected.extend(push());
    expected.push(La(P, 1.into()));
    expected.extend(pop());
    expected.extend([
        Add(P, S, P),
        Store(P, (-4).into(), Bp),
        // return (y)
        Load(P, (-4).into(), Bp),
        Add(Ret, P, Zero),
        AddI(Sp, Sp, 4),
        Load(Target, 4.into(), Bp),
        Br(Target),
        // end of body block, then the implicit return
        AddI(Sp, Sp, 4),
        Load(Target, 4.into(), Bp),
        Br(Target),
    ]);

    assert_eq!(code, expected);
}

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let mut expected = vec![La(P, 2.into())];
    expected.extend(push());
    expected.push(La(P, 3.into()));
    expected.extend(push());
    expected.push(La(P, 4.into()));
    expected.extend(pop());
    expected.push(Mul(P, S, P));
    expected.extend(pop());
    expected.push(Add(P, S, P));

    assert_eq!(expression("2 + 3 * 4"), expected);
}

#[test]
fn test_subtraction_keeps_operand_order() {
    let mut expected = vec![La(P, 9.into())];
    expected.extend(push());
    expected.push(La(P, 4.into()));
    expected.extend(pop());
    expected.push(Sub(P, S, P));

    assert_eq!(expression("9 - 4"), expected);
}

#[test]
fn test_comparison_sequences() {
    let tail = |expr: &str| {
        let code = expression(expr);
        let start = code.iter().position(|i| matches!(i, Sub(..))).unwrap();
        code[start..].to_vec()
    };
    let sign = Shift::Count(31);

    assert_eq!(tail("1 < 2"), vec![Sub(P, S, P), Shra(P, P, sign)]);
    assert_eq!(tail("1 >= 2"), vec![Sub(P, S, P), Shra(P, P, sign), Lnot(P, P)]);
    assert_eq!(tail("1 > 2"), vec![Sub(P, S, P), Neg(P, P), Shra(P, P, sign)]);
    assert_eq!(
        tail("1 <= 2"),
        vec![Sub(P, S, P), Neg(P, P), Shra(P, P, sign), Lnot(P, P)]
    );
    assert_eq!(tail("1 == 2"), vec![Sub(P, S, P), Lnot(P, P)]);
    assert_eq!(tail("1 != 2"), vec![Sub(P, S, P)]);
}

#[test]
fn test_unary_operators() {
    assert_eq!(expression("-5"), vec![La(P, 5.into()), Neg(P, P)]);
    assert_eq!(expression("+5"), vec![La(P, 5.into())]);
    assert_eq!(expression("~5"), vec![La(P, 5.into()), Not(P, P)]);
    assert_eq!(expression("!5"), vec![La(P, 5.into()), Lnot(P, P)]);
}

#[test]
fn test_shift_operators_use_primary_as_count() {
    let code = expression("1 << 3");
    assert_eq!(code.last(), Some(&Shl(P, S, Shift::Reg(P))));
    let code = expression("8 >> 3");
    assert_eq!(code.last(), Some(&Shr(P, S, Shift::Reg(P))));
}

#[test]
fn test_while_layout() {
    let code = translate("function main() { var i = 0; while (i < 3) { i = i + 1; } return i; }").unwrap();

    // L0 is the loop top, L1 the exit
    let top = code.iter().position(|i| *i == Label("L0".to_string())).unwrap();
    let exit = code.iter().position(|i| *i == Label("L1".to_string())).unwrap();
    assert!(top < exit);
    assert_eq!(code[top + 1], Load(P, (-4).into(), Bp));
    assert_eq!(&code[exit - 2..exit], &[La(Target, label("L0")), Br(Target)]);

    let exit_posts = code.iter().filter(|i| **i == Label("L1".to_string())).count();
    assert_eq!(exit_posts, 1);

    let conditional = code.iter().position(|i| matches!(i, Brzr(Target, P))).unwrap();
    assert_eq!(code[conditional - 1], La(Target, label("L1")));
}

#[test]
fn test_if_else_layout() {
    let code = translate("function main() { if (1) { return 1; } else { return 2; } }").unwrap();
    let labels = posted_labels(&code);
    assert_eq!(labels, vec!["main", "L0", "L1"]);

    let skip = code.iter().position(|i| *i == Label("L0".to_string())).unwrap();
    assert_eq!(&code[skip - 2..skip], &[La(Target, label("L1")), Br(Target)]);
}

#[test]
fn test_labels_are_unique_and_increasing() {
    let source = "
        var a;
        var b = 1;
        function f(x) { while (x) { if (x > 1) { x = x - 1; } else { x = 0; } } return x; }
        function g() { if (b) { b = 0; } }
        function main() { while (a < 3) { a = a + 1; } return f(a) + g(); }";
    let code = translate(source).unwrap();
    let labels = posted_labels(&code);

    let mut unique = labels.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), labels.len());

    let globals: Vec<&String> = labels.iter().filter(|l| l.starts_with("GL")).collect();
    assert_eq!(globals, vec!["GL0", "GL2"]);

    let functions: Vec<u32> = labels
        .iter()
        .filter_map(|l| l.strip_prefix("FN"))
        .map(|n| n.parse().unwrap())
        .collect();
    assert_eq!(functions.len(), 2);
    assert!(functions[0] < functions[1]);
    assert!(labels.contains(&"main".to_string()));
}

#[test]
fn test_call_site_sequence() {
    let code = translate("function two(a, b) { return a; } function main() { return two(7, 8); }").unwrap();
    let call = code.iter().position(|i| *i == AddI(Sp, Sp, -12)).unwrap();

    assert_eq!(
        &code[call..call + 13],
        &[
            AddI(Sp, Sp, -12),
            La(P, 7.into()),
            Store(P, 8.into(), Sp),
            La(P, 8.into()),
            Store(P, 12.into(), Sp),
            Store(Bp, 0.into(), Sp),
            AddI(Sp, Sp, -4),
            AddI(Bp, Sp, 4),
            La(Target, label("FN0")),
            Brl(Link, Target),
            Load(Bp, 0.into(), Bp),
            AddI(Sp, Sp, 16),
            Add(P, Ret, Zero),
        ]
    );
}

#[test]
fn test_early_return_releases_every_open_block() {
    let code = translate(
        "function main() { var a; if (a) { var b; var c; while (c) { var d; return 1; } } }",
    )
    .unwrap();
    let ret = code.iter().position(|i| *i == Add(Ret, P, Zero)).unwrap();
    assert_eq!(code[ret + 1], AddI(Sp, Sp, 16));
}

#[test]
fn test_bare_return_leaves_return_register_alone() {
    let code = translate("function main() { return; }").unwrap();
    assert!(!code.contains(&Add(Ret, P, Zero)));
}

#[test]
fn test_main_label_does_not_consume_counter() {
    let code = translate("function main() { } function f() { }").unwrap();
    assert!(code.contains(&Label("FN0".to_string())));
}

#[test]
fn test_comments_are_skipped() {
    let code = translate("// leading\nfunction main() { // inside\n return 3; // trailing\n}").unwrap();
    assert!(code.contains(&La(P, 3.into())));
}

#[test]
fn test_undeclared_call_emits_no_call_code() {
    let (err, code) = translate_err("function main() { return g(1); }");
    assert!(matches!(err, CompilerError::UndeclaredIdentifier { ref name, .. } if name == "g"));
    assert_eq!(code.last(), Some(&Store(Link, 4.into(), Bp)));
}

#[test]
fn test_undeclared_variable() {
    let (err, _) = translate_err("function main() { y = 1; }");
    assert!(matches!(err, CompilerError::UndeclaredIdentifier { ref name, .. } if name == "y"));
    let location = err.location().unwrap();
    assert_eq!((location.line, location.column), (1, 19));
}

#[test]
fn test_duplicate_declarations() {
    let cases = [
        "var a; var a; function main() { }",
        "var f; function f() { } function main() { }",
        "function main() { } function main() { }",
        "function f(a, a) { } function main() { }",
        "function main() { var a; var a; }",
    ];
    for source in cases {
        let (err, _) = translate_err(source);
        assert!(
            matches!(err, CompilerError::DuplicateSymbol { .. }),
            "{source}: {err:?}"
        );
    }
}

#[test]
fn test_nested_block_may_shadow() {
    translate("var a; function main() { var a; if (a) { var a; } }").unwrap();
    // the body block is a scope of its own inside the parameter scope
    translate("function f(a) { var a; } function main() { }").unwrap();
}

#[test]
fn test_keywords_cannot_be_declared() {
    for source in [
        "var while; function main() { }",
        "function if() { } function main() { }",
        "function main() { var return; }",
        "function f(else) { } function main() { }",
    ] {
        let (err, _) = translate_err(source);
        assert!(matches!(err, CompilerError::ShadowsKeyword { .. }), "{source}: {err:?}");
    }
}

#[test]
fn test_argument_count_is_checked() {
    let (err, _) = translate_err("function f(a) { } function main() { f(); }");
    assert!(matches!(
        err,
        CompilerError::ArgumentCountMismatch { expected: 1, found: 0, .. }
    ));

    let (err, _) = translate_err("function f(a) { } function main() { f(1, 2); }");
    assert!(matches!(
        err,
        CompilerError::ArgumentCountMismatch { expected: 1, found: 2, .. }
    ));
}

#[test]
fn test_main_is_required() {
    let (err, _) = translate_err("function helper() { }");
    assert!(matches!(err, CompilerError::UndeclaredIdentifier { ref name, .. } if name == "main"));

    let (err, _) = translate_err("var main; ");
    assert!(matches!(err, CompilerError::UndeclaredIdentifier { .. }));

    let (err, _) = translate_err("function main(argc) { }");
    assert!(matches!(err, CompilerError::ArgumentCountMismatch { .. }));
}

#[test]
fn test_syntax_errors() {
    let cases = [
        ("function main() { return 1 }", "';'"),
        ("function main() { return 1;", "'}'"),
        ("function main() { var x = ; }", "expression"),
        ("function main() { 5; }", "statement"),
        ("function main() { else { } }", "statement"),
        ("function main() { } var late;", "'function'"),
        ("function main() { return main; }", "'('"),
    ];
    for (source, what) in cases {
        let (err, _) = translate_err(source);
        match err {
            CompilerError::SyntaxError { ref expected, .. } => assert_eq!(expected, what, "{source}"),
            other => panic!("{source}: unexpected {other:?}"),
        }
    }
}

#[test]
fn test_function_used_as_variable_target() {
    let (err, _) = translate_err("function f() { } function main() { f = 1; }");
    assert!(matches!(err, CompilerError::SyntaxError { .. }));
}

/// Translate on a thread with the stack size of a main thread, as the
/// driver does
fn translate_on_main_sized_stack(source: String) -> Result<Vec<AsmInst>, CompilerError> {
    thread::Builder::new()
        .stack_size(8 << 20)
        .spawn(move || translate(&source))
        .unwrap()
        .join()
        .unwrap()
}

fn assert_too_deep(source: String) {
    match translate_on_main_sized_stack(source) {
        Err(CompilerError::SyntaxError { found, .. }) => assert_eq!(found, "nesting too deep"),
        other => panic!("Expected nesting error, got {other:?}"),
    }
}

#[test]
fn test_deep_nesting_is_a_syntax_error() {
    let depth = 5000;
    let parens = format!(
        "function main() {{ return {}1{}; }}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    assert_too_deep(parens);

    let signs = format!("function main() {{ return {}1; }}", "-".repeat(depth));
    assert_too_deep(signs);

    let nots = format!("function main() {{ return {}1; }}", "!".repeat(depth));
    assert_too_deep(nots);

    let blocks = format!(
        "function main() {{ {} }}",
        "if (1) {".repeat(depth) + &"}".repeat(depth)
    );
    assert_too_deep(blocks);

    let calls = format!(
        "function f(a) {{ return a; }} function main() {{ return {}1{}; }}",
        "f(".repeat(depth),
        ")".repeat(depth)
    );
    assert_too_deep(calls);
}

#[test]
fn test_nesting_limit_boundary() {
    // The function body and the return expression take two levels.
    let nested = |n: usize| {
        format!(
            "function main() {{ return {}1{}; }}",
            "(".repeat(n),
            ")".repeat(n)
        )
    };
    let deepest = MAX_NESTING_DEPTH - 2;
    assert!(translate_on_main_sized_stack(nested(deepest)).is_ok());
    assert_too_deep(nested(deepest + 1));
}

#[test]
fn test_nesting_depth_resets_between_siblings() {
    let n = MAX_NESTING_DEPTH - 3;
    let group = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    let source = format!(
        "function main() {{ var a = {g}; var b = {g}; return {g} + {g}; }}",
        g = group
    );
    assert!(translate_on_main_sized_stack(source).is_ok());
}
