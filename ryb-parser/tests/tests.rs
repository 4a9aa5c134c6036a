use ryb_core::ast::{ClassName, DefKind, Expr, ExprKind, MethodName, Param};
use ryb_parser::{Options, ParseError, Resolver};

fn parse(source: &str) -> Expr {
    let mut resolver = Resolver::new(Options {
        skip_bootstrap: true,
        ..Options::default()
    });
    ryb_parser::parse_program(source, &mut resolver).expect("input did not parse successfully")
}

fn parse_err(source: &str) -> ParseError {
    let mut resolver = Resolver::new(Options {
        skip_bootstrap: true,
        ..Options::default()
    });
    ryb_parser::parse_program(source, &mut resolver).expect_err("input parsed unexpectedly")
}

/// The compact structural dump; spans are not part of it, which makes it
/// the right tool for tree-shape comparisons.
fn dump(source: &str) -> String {
    parse(source).to_string()
}

fn top(source: &str) -> Vec<Expr> {
    match parse(source).kind {
        ExprKind::Do(exprs) => exprs,
        other => panic!("expected a statement sequence, got {:?}", other),
    }
}

#[test]
fn class_with_method_test() {
    let exprs = top("class Foo < Bar\ndef baz(x, y=1)\nx\nend\nend");
    assert_eq!(exprs.len(), 1);
    let (kind, name, super_class, body) = match &exprs[0].kind {
        ExprKind::ClassDef {
            kind,
            name,
            super_class,
            body,
        } => (kind, name, super_class, body),
        other => panic!("expected a class definition, got {:?}", other),
    };
    assert_eq!(*kind, DefKind::Class);
    assert_eq!(*name, ClassName::Named(String::from("Foo")));
    assert_eq!(super_class, "Bar");
    assert_eq!(body.len(), 1);
    match &body[0].kind {
        ExprKind::Defm { name, params, body } => {
            assert_eq!(*name, MethodName::Simple(String::from("baz")));
            assert_eq!(params.len(), 2);
            assert_eq!(params[0], Param::Plain(String::from("x")));
            match &params[1] {
                Param::Default(name, default) => {
                    assert_eq!(name, "y");
                    assert_eq!(default.kind, ExprKind::Integer(1));
                }
                other => panic!("expected a defaulted parameter, got {:?}", other),
            }
            assert_eq!(body.len(), 1);
            assert_eq!(body[0].kind, ExprKind::Name(String::from("x")));
        }
        other => panic!("expected a method definition, got {:?}", other),
    }
}

#[test]
fn superclass_defaults_to_object_test() {
    let exprs = top("class Foo\nend");
    match &exprs[0].kind {
        ExprKind::ClassDef { super_class, .. } => assert_eq!(super_class, "Object"),
        other => panic!("expected a class definition, got {:?}", other),
    }
}

#[test]
fn while_do_test() {
    assert_eq!(dump("while x > 0 do\nx\nend"), "(do (while (> x 0) (do x)))");
}

#[test]
fn while_modifier_test() {
    assert_eq!(dump("x while y"), "(do (while y x))");
}

#[test]
fn if_modifier_test() {
    assert_eq!(dump("x if y"), "(do (if y x))");
}

#[test]
fn rescue_modifier_test() {
    assert_eq!(dump("x rescue y"), "(do (rescue y x))");
}

#[test]
fn if_full_form_test() {
    assert_eq!(
        dump("if x\ny\nelse\nz\nend"),
        "(do (if x (do y) (do z)))"
    );
}

#[test]
fn if_then_on_one_line_test() {
    assert_eq!(dump("if x then y end"), "(do (if x (do y)))");
}

#[test]
fn unless_test() {
    assert_eq!(dump("unless x\ny\nend"), "(do (unless x (do y)))");
}

#[test]
fn elsif_desugar_test() {
    // "elsif" is exactly "else if ... end" nested one level deeper.
    let sugar = dump("if a\nx\nelsif b\ny\nelse\nz\nend");
    let nested = dump("if a\nx\nelse\nif b\ny\nelse\nz\nend\nend");
    assert_eq!(sugar, nested);
    assert_eq!(sugar, "(do (if a (do x) (do (if b (do y) (do z)))))");
}

#[test]
fn block_form_equivalence_test() {
    let braces = dump("each { |a, b| a }");
    let do_end = dump("each do |a, b| a end");
    assert_eq!(braces, "(do (call each () (proc (a b) a)))");
    assert_eq!(braces, do_end);
}

#[test]
fn empty_block_test() {
    assert_eq!(dump("run { }"), "(do (call run () (proc)))");
}

#[test]
fn lambda_test() {
    assert_eq!(dump("lambda do |x| x end"), "(do (lambda (x) x))");
}

#[test]
fn lambda_requires_block_test() {
    let err = parse_err("lambda 5");
    assert!(err.message.contains("do .. end block"), "{}", err);
}

#[test]
fn case_test() {
    assert_eq!(
        dump("case x\nwhen 1: y\nwhen 2\nz\nelse\nw\nend"),
        "(do (case x (when 1 y) (when 2 z) (else w)))"
    );
}

#[test]
fn case_without_else_test() {
    assert_eq!(dump("case x\nwhen 1\ny\nend"), "(do (case x (when 1 y)))");
}

#[test]
fn begin_rescue_test() {
    assert_eq!(
        dump("begin\nf()\nrescue Error => e\ng()\nend"),
        "(do (begin (call f ()) (rescue Error => e (call g ()))))"
    );
}

#[test]
fn begin_without_rescue_test() {
    assert_eq!(dump("begin\nf()\nend"), "(do (begin (call f ())))");
}

#[test]
fn qualified_def_test() {
    assert_eq!(dump("def self.foo(x)\nx\nend"), "(do (defm self.foo (x) x))");
}

#[test]
fn operator_def_test() {
    assert_eq!(dump("def ==(other)\nother\nend"), "(do (defm == (other) other))");
}

#[test]
fn bare_arglist_def_test() {
    assert_eq!(dump("def f a, b\na\nend"), "(do (defm f (a b) a))");
}

#[test]
fn rest_and_block_param_test() {
    assert_eq!(dump("def f(*rest, &blk)\nend"), "(do (defm f (*rest &blk)))");
}

#[test]
fn directive_test() {
    assert_eq!(
        dump("%s(assign x (add x 1))"),
        "(do (sexp assign x (add x 1)))"
    );
}

#[test]
fn directive_keywords_are_atoms_test() {
    assert_eq!(
        dump("%s(if (eq a 0) b c)"),
        "(do (sexp if (eq a 0) b c))"
    );
}

#[test]
fn semicolon_separator_test() {
    assert_eq!(dump("a; b"), "(do a b)");
}

#[test]
fn assignment_and_call_test() {
    assert_eq!(dump("x = y.step(1)"), "(do (assign x (callm y step (1))))");
}

#[test]
fn precedence_test() {
    assert_eq!(dump("a + b * c == d"), "(do (== (+ a (* b c)) d))");
}

#[test]
fn assignment_is_right_associative_test() {
    assert_eq!(dump("a = b = c"), "(do (assign a (assign b c)))");
}

#[test]
fn unary_test() {
    assert_eq!(dump("!x"), "(do (! x))");
    assert_eq!(dump("-5 + 2"), "(do (+ (- 5) 2))");
}

#[test]
fn include_test() {
    assert_eq!(dump("include Enumerable"), "(do (include Enumerable))");
}

#[test]
fn deferred_require_flag_test() {
    let mut resolver = Resolver::new(Options {
        skip_bootstrap: true,
        defer_requires: true,
        ..Options::default()
    });
    let tree = ryb_parser::parse_program("require \"foo\"", &mut resolver)
        .expect("input did not parse successfully");
    assert_eq!(tree.to_string(), "(do (require \"foo\"))");
}

#[test]
fn computed_require_is_deferred_test() {
    // A non-literal target cannot be statically resolved.
    assert_eq!(dump("require foo"), "(do (require foo))");
}

#[test]
fn unterminated_if_test() {
    let err = parse_err("if x\ny\n");
    assert!(
        err.message.contains("expression or 'end' for open 'if'"),
        "{}",
        err
    );
}

#[test]
fn missing_condition_test() {
    let err = parse_err("while\nend");
    assert!(err.message.contains("condition for 'while' block"), "{}", err);
}

#[test]
fn missing_rest_name_test() {
    let err = parse_err("def f(*)\nend");
    assert!(err.message.contains("argument name following '*'"), "{}", err);
}

#[test]
fn lowercase_class_name_test() {
    let err = parse_err("class foo\nend");
    assert!(err.message.contains("class name"), "{}", err);
}

#[test]
fn missing_superclass_test() {
    let err = parse_err("class Foo <\nend");
    assert!(err.message.contains("superclass"), "{}", err);
}

#[test]
fn trailing_input_test() {
    let err = parse_err("x )");
    assert!(err.message.contains("expected end of input"), "{}", err);
    assert_eq!(err.pos, 2);
}

#[test]
fn bootstrap_core_test() {
    let mut resolver = Resolver::new(Options::default());
    let tree = ryb_parser::parse_program("", &mut resolver)
        .expect("bootstrap core did not parse successfully");
    match tree.kind {
        ExprKind::Do(exprs) => {
            assert_eq!(exprs.len(), 1);
            assert!(matches!(exprs[0].kind, ExprKind::Required(_)));
        }
        other => panic!("expected a statement sequence, got {:?}", other),
    }
}
