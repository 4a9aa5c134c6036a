use std::fmt;

use crate::span::Span;

/// Represents an expression node.
///
/// Every node carries the span of the source region it was parsed from.
/// Once a grammar rule has assigned a span, enclosing rules do not
/// overwrite it.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    /// The source region this node was parsed from.
    pub span: Span,
    /// What kind of construct this node is.
    pub kind: ExprKind,
}

impl Expr {
    /// Construct an expression node.
    pub fn new(span: Span, kind: ExprKind) -> Self {
        Self { span, kind }
    }
}

/// Represents the different kinds of expression nodes.
///
/// Example:
/// ```text
/// "name"                 counter
/// "assignment"           counter = 10
/// "method call"          counter.step(5)
/// "conditional"          if counter > 0 ... end
/// "method definition"    def step(n) ... end
/// "class definition"     class Counter < Object ... end
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// A reference to a binding (eg. `counter`, `@total`, `Object`).
    Name(String),
    /// A symbol literal (eg. `:foo`).
    Symbol(String),
    /// An integer literal (eg. `42`).
    Integer(i64),
    /// A string literal (eg. `"hello"`).
    Str(String),
    /// An untagged, plain sequence of expressions.
    ///
    /// Produced for nodes that have no construct tag of their own, such as
    /// nested lists inside a low-level directive. Callers distinguish it
    /// structurally.
    List(Vec<Expr>),
    /// An inline low-level directive (eg. `%s(index self 0)`).
    Sexp(Vec<Expr>),
    /// A unary operator application (eg. `!done`, `-1`).
    Unary { op: String, expr: Box<Expr> },
    /// A binary operator application (eg. `counter + 1`).
    Binary {
        op: String,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// An assignment (eg. `counter = 10`).
    Assign { target: Box<Expr>, value: Box<Expr> },
    /// A method call, with or without an explicit receiver.
    ///
    /// A trailing block argument (`{ ... }` or `do ... end`) attaches here.
    Call {
        receiver: Option<Box<Expr>>,
        name: String,
        args: Vec<Expr>,
        block: Option<Box<Expr>>,
    },
    /// A sequence of statements (the body of a control construct).
    Do(Vec<Expr>),
    /// An `if`/`unless` conditional.
    ///
    /// `elsif` chains desugar into a nested conditional as the sole
    /// statement of the else branch. For the statement-modifier form
    /// (`x if y`), `body` is the bare guarded statement rather than a
    /// statement sequence.
    If {
        negated: bool,
        cond: Box<Expr>,
        body: Box<Expr>,
        els: Option<Box<Expr>>,
    },
    /// A `while` loop. As with conditionals, the statement-modifier form
    /// keeps the bare statement as its body.
    While { cond: Box<Expr>, body: Box<Expr> },
    /// A `case` expression with its `when` arms.
    Case {
        cond: Box<Expr>,
        whens: Vec<When>,
        els: Option<Vec<Expr>>,
    },
    /// A `begin ... rescue ... end` construct.
    Begin {
        body: Vec<Expr>,
        rescue: Option<Rescue>,
    },
    /// The statement-modifier form of `rescue` (`x rescue y`).
    ///
    /// This deliberately keeps a different shape from the full
    /// [`Rescue`] clause: it has no exception class or binding.
    RescueMod { cond: Box<Expr>, body: Box<Expr> },
    /// A block (`{ |a, b| ... }` or `do |a, b| ... end`).
    ///
    /// A block with neither parameters nor statements is the bare marker
    /// form (both sequences empty).
    Proc { params: Vec<String>, body: Vec<Expr> },
    /// A lambda: structurally a block under a different tag.
    Lambda { params: Vec<String>, body: Vec<Expr> },
    /// A method definition.
    Defm {
        name: MethodName,
        params: Vec<Param>,
        body: Vec<Expr>,
    },
    /// A class or module definition.
    ClassDef {
        kind: DefKind,
        name: ClassName,
        super_class: String,
        body: Vec<Expr>,
    },
    /// A deferred `require` whose target is carried for a later phase.
    Require(Box<Expr>),
    /// A `require` that was statically resolved; wraps the parsed tree of
    /// the required source.
    Required(Box<Expr>),
    /// An `include` of a module by name.
    Include(String),
}

/// Whether a definition introduces a class or a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefKind {
    Class,
    Module,
}

/// The name position of a class definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassName {
    /// An ordinary capitalized class name.
    Named(String),
    /// The singleton-class marker (`class << ...`).
    Singleton,
}

/// The name position of a method definition.
///
/// A dot-qualified name (`def receiver.name`) is kept as the two parts in
/// parse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodName {
    Simple(String),
    Qualified(String, String),
}

/// One parameter of a method definition, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// A plain named parameter.
    Plain(String),
    /// A rest parameter (`*args`).
    Rest(String),
    /// A block-capture parameter (`&blk`).
    Block(String),
    /// A parameter with a default value (`n = 1`).
    Default(String, Expr),
}

/// One `when` arm of a `case` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct When {
    pub span: Span,
    pub cond: Expr,
    pub body: Vec<Expr>,
}

/// The rescue clause of a `begin` construct.
#[derive(Debug, Clone, PartialEq)]
pub struct Rescue {
    pub span: Span,
    /// The exception class to match, if named.
    pub class: Option<String>,
    /// The binding introduced by `=> name`, if present.
    pub binding: Option<String>,
    pub body: Vec<Expr>,
}

impl fmt::Display for MethodName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodName::Simple(name) => write!(f, "{}", name),
            MethodName::Qualified(receiver, name) => write!(f, "{}.{}", receiver, name),
        }
    }
}

impl fmt::Display for ClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassName::Named(name) => write!(f, "{}", name),
            ClassName::Singleton => write!(f, "<<"),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Plain(name) => write!(f, "{}", name),
            Param::Rest(name) => write!(f, "*{}", name),
            Param::Block(name) => write!(f, "&{}", name),
            Param::Default(name, value) => write!(f, "{}={}", name, value),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, exprs: &[Expr]) -> fmt::Result {
    for expr in exprs {
        write!(f, " {}", expr)?;
    }
    Ok(())
}

/// Prints a node as a compact `(tag child ...)` dump.
///
/// Spans are not part of the output, which makes the dump usable for
/// comparing trees that should be structurally identical.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Name(name) => write!(f, "{}", name),
            ExprKind::Symbol(name) => write!(f, ":{}", name),
            ExprKind::Integer(value) => write!(f, "{}", value),
            ExprKind::Str(value) => write!(f, "{:?}", value),
            ExprKind::List(exprs) => {
                write!(f, "(")?;
                for (i, expr) in exprs.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", expr)?;
                }
                write!(f, ")")
            }
            ExprKind::Sexp(exprs) => {
                write!(f, "(sexp")?;
                write_seq(f, exprs)?;
                write!(f, ")")
            }
            ExprKind::Unary { op, expr } => write!(f, "({} {})", op, expr),
            ExprKind::Binary { op, lhs, rhs } => write!(f, "({} {} {})", op, lhs, rhs),
            ExprKind::Assign { target, value } => write!(f, "(assign {} {})", target, value),
            ExprKind::Call {
                receiver,
                name,
                args,
                block,
            } => {
                match receiver {
                    Some(receiver) => write!(f, "(callm {} {}", receiver, name)?,
                    None => write!(f, "(call {}", name)?,
                }
                write!(f, " (")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")?;
                if let Some(block) = block {
                    write!(f, " {}", block)?;
                }
                write!(f, ")")
            }
            ExprKind::Do(exprs) => {
                write!(f, "(do")?;
                write_seq(f, exprs)?;
                write!(f, ")")
            }
            ExprKind::If {
                negated,
                cond,
                body,
                els,
            } => {
                let tag = if *negated { "unless" } else { "if" };
                write!(f, "({} {} {}", tag, cond, body)?;
                if let Some(els) = els {
                    write!(f, " {}", els)?;
                }
                write!(f, ")")
            }
            ExprKind::While { cond, body } => write!(f, "(while {} {})", cond, body),
            ExprKind::Case { cond, whens, els } => {
                write!(f, "(case {}", cond)?;
                for when in whens {
                    write!(f, " (when {}", when.cond)?;
                    write_seq(f, &when.body)?;
                    write!(f, ")")?;
                }
                if let Some(els) = els {
                    write!(f, " (else")?;
                    write_seq(f, els)?;
                    write!(f, ")")?;
                }
                write!(f, ")")
            }
            ExprKind::Begin { body, rescue } => {
                write!(f, "(begin")?;
                write_seq(f, body)?;
                if let Some(rescue) = rescue {
                    write!(f, " (rescue")?;
                    if let Some(class) = &rescue.class {
                        write!(f, " {}", class)?;
                    }
                    if let Some(binding) = &rescue.binding {
                        write!(f, " => {}", binding)?;
                    }
                    write_seq(f, &rescue.body)?;
                    write!(f, ")")?;
                }
                write!(f, ")")
            }
            ExprKind::RescueMod { cond, body } => write!(f, "(rescue {} {})", cond, body),
            ExprKind::Proc { params, body } | ExprKind::Lambda { params, body } => {
                let tag = match &self.kind {
                    ExprKind::Lambda { .. } => "lambda",
                    _ => "proc",
                };
                if params.is_empty() && body.is_empty() {
                    return write!(f, "({})", tag);
                }
                write!(f, "({} ({})", tag, params.join(" "))?;
                write_seq(f, body)?;
                write!(f, ")")
            }
            ExprKind::Defm { name, params, body } => {
                write!(f, "(defm {} (", name)?;
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", param)?;
                }
                write!(f, ")")?;
                write_seq(f, body)?;
                write!(f, ")")
            }
            ExprKind::ClassDef {
                kind,
                name,
                super_class,
                body,
            } => {
                let tag = match kind {
                    DefKind::Class => "class",
                    DefKind::Module => "module",
                };
                write!(f, "({} {} {}", tag, name, super_class)?;
                write_seq(f, body)?;
                write!(f, ")")
            }
            ExprKind::Require(target) => write!(f, "(require {})", target),
            ExprKind::Required(tree) => write!(f, "(required {})", tree),
            ExprKind::Include(name) => write!(f, "(include {})", name),
        }
    }
}
