use ryb_core::span::Span;
use ryb_lexer::{Keyword, Lexer, Token, TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).map(|token| token.kind).collect()
}

#[test]
fn class_header_test() {
    assert_eq!(
        kinds("class Foo < Bar"),
        vec![
            TokenKind::Keyword(Keyword::Class),
            TokenKind::Atom(String::from("Foo")),
            TokenKind::Lt,
            TokenKind::Atom(String::from("Bar")),
        ]
    );
}

#[test]
fn span_test() {
    let mut lexer = Lexer::new("def baz");
    assert_eq!(
        lexer.next(),
        Some(Token::new(
            TokenKind::Keyword(Keyword::Def),
            Span::new(0, 3)
        ))
    );
    assert_eq!(
        lexer.next(),
        Some(Token::new(
            TokenKind::Atom(String::from("baz")),
            Span::new(4, 7)
        ))
    );
    assert_eq!(lexer.next(), None);
}

#[test]
fn newlines_are_tokens_test() {
    assert_eq!(
        kinds("a\nb"),
        vec![
            TokenKind::Atom(String::from("a")),
            TokenKind::Newline,
            TokenKind::Atom(String::from("b")),
        ]
    );
}

#[test]
fn method_name_suffix_test() {
    assert_eq!(
        kinds("nil? x! a != b"),
        vec![
            TokenKind::Atom(String::from("nil?")),
            TokenKind::Atom(String::from("x!")),
            TokenKind::Atom(String::from("a")),
            TokenKind::Ne,
            TokenKind::Atom(String::from("b")),
        ]
    );
}

#[test]
fn symbol_and_colon_test() {
    assert_eq!(
        kinds(":foo when 1: x"),
        vec![
            TokenKind::LitSymbol(String::from("foo")),
            TokenKind::Keyword(Keyword::When),
            TokenKind::LitInteger(1),
            TokenKind::Colon,
            TokenKind::Atom(String::from("x")),
        ]
    );
}

#[test]
fn directive_opener_test() {
    assert_eq!(
        kinds("%s(add 1 2) %"),
        vec![
            TokenKind::SexpBegin,
            TokenKind::Atom(String::from("add")),
            TokenKind::LitInteger(1),
            TokenKind::LitInteger(2),
            TokenKind::RParen,
            TokenKind::Percent,
        ]
    );
}

#[test]
fn string_escape_test() {
    assert_eq!(
        kinds("\"a\\nb\" 'c\\'d'"),
        vec![
            TokenKind::LitString(String::from("a\nb")),
            TokenKind::LitString(String::from("c'd")),
        ]
    );
}

#[test]
fn comment_test() {
    assert_eq!(
        kinds("x # hi\ny"),
        vec![
            TokenKind::Atom(String::from("x")),
            TokenKind::Comment(String::from(" hi")),
            TokenKind::Newline,
            TokenKind::Atom(String::from("y")),
        ]
    );

    let skipped: Vec<TokenKind> = Lexer::new("x # hi\ny")
        .skip_comments(true)
        .map(|token| token.kind)
        .collect();
    assert_eq!(
        skipped,
        vec![
            TokenKind::Atom(String::from("x")),
            TokenKind::Newline,
            TokenKind::Atom(String::from("y")),
        ]
    );
}

#[test]
fn big_integer_fallback_test() {
    assert_eq!(
        kinds("123456789012345678901234567890"),
        vec![TokenKind::LitBigInteger(String::from(
            "123456789012345678901234567890"
        ))]
    );
}

#[test]
fn instance_variable_test() {
    assert_eq!(
        kinds("@a @@b"),
        vec![
            TokenKind::Atom(String::from("@a")),
            TokenKind::Atom(String::from("@@b")),
        ]
    );
}

#[test]
fn operator_test() {
    assert_eq!(
        kinds("== => = << <= && || | &"),
        vec![
            TokenKind::EqEq,
            TokenKind::FatArrow,
            TokenKind::Assign,
            TokenKind::Shl,
            TokenKind::Le,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::Pipe,
            TokenKind::Amp,
        ]
    );
}
