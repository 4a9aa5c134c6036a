//! The static include resolver.
//!
//! Turns a `require` of a literal name into an eagerly parsed sub-tree,
//! exactly once per distinct name for the whole compilation run. A name
//! being parsed is marked in progress so that a require cycle closes to an
//! empty tree instead of recursing without bound.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use ryb_core::ast::{Expr, ExprKind};
use ryb_core::span::Span;
use ryb_lexer::{Lexer, Token};

use crate::error::ParseError;
use crate::grammar::Parser;

/// The fixed extension of Ryb source files.
pub const SOURCE_EXT: &str = ".ryb";

/// The logical name of the bootstrap core source, statically required in
/// front of every program unless suppressed.
pub const BOOTSTRAP_SOURCE: &str = "core/core";

/// How the resolver opens source files.
///
/// The disk implementation is what the compiler uses; tests substitute
/// their own to observe or fake file access.
pub trait SourceLoader {
    fn load(&self, path: &Path) -> io::Result<String>;
}

/// Loads sources from the filesystem.
pub struct DiskLoader;

impl SourceLoader for DiskLoader {
    fn load(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Configuration for one compilation run.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Additional directories to search for required sources.
    pub include_paths: Vec<PathBuf>,
    /// Do not statically include the bootstrap core sources.
    pub skip_bootstrap: bool,
    /// Emit deferred `require` nodes instead of statically inlining.
    pub defer_requires: bool,
}

enum CacheEntry {
    /// Parsing of this source is underway.
    InProgress,
    Done(Expr),
}

/// Resolves `require` targets against the include-path table and memoises
/// the parsed trees for the lifetime of one compilation run.
///
/// The cache lives exactly as long as the resolver: a compilation session
/// creates one, threads it through every parser it spawns, and drops it
/// when the run is over.
pub struct Resolver {
    include_paths: Vec<PathBuf>,
    skip_bootstrap: bool,
    defer_requires: bool,
    cache: HashMap<String, CacheEntry>,
    loader: Box<dyn SourceLoader>,
}

impl Resolver {
    pub fn new(opts: Options) -> Self {
        Self::with_loader(opts, Box::new(DiskLoader))
    }

    pub fn with_loader(opts: Options, loader: Box<dyn SourceLoader>) -> Self {
        let mut include_paths = opts.include_paths;
        include_paths.push(stdlib_dir());
        Self {
            include_paths,
            skip_bootstrap: opts.skip_bootstrap,
            defer_requires: opts.defer_requires,
            cache: HashMap::new(),
            loader,
        }
    }

    pub fn skip_bootstrap(&self) -> bool {
        self.skip_bootstrap
    }

    pub fn defer_requires(&self) -> bool {
        self.defer_requires
    }

    /// Candidate file paths for a required name, in resolution order.
    ///
    /// An absolute name stands alone; a relative name is tried against
    /// every include directory in order. The source extension is appended
    /// whenever the name does not already end with it.
    pub fn candidate_paths(&self, name: &str) -> Vec<PathBuf> {
        if Path::new(name).is_absolute() {
            vec![with_ext(name)]
        } else {
            self.include_paths
                .iter()
                .map(|dir| dir.join(with_ext(name)))
                .collect()
        }
    }

    /// Resolve and parse a required source, memoising the result under the
    /// literal name as written.
    ///
    /// The first candidate path that can be opened wins; if none can be
    /// opened the whole compilation fails, reporting the requested name at
    /// `pos` (the byte offset of the require site).
    pub fn resolve(&mut self, name: &str, pos: usize) -> Result<Expr, ParseError> {
        match self.cache.get(name) {
            Some(CacheEntry::InProgress) => {
                return Ok(Expr::new(Span::point(pos), ExprKind::Do(Vec::new())));
            }
            Some(CacheEntry::Done(tree)) => return Ok(tree.clone()),
            None => {}
        }
        let mut opened = None;
        for path in self.candidate_paths(name) {
            if let Ok(source) = self.loader.load(&path) {
                opened = Some((path, source));
                break;
            }
        }
        let (path, source) = match opened {
            Some(opened) => opened,
            None => return Err(ParseError::new(pos, format!("unable to load '{}'", name))),
        };
        eprintln!(
            "NOTICE: statically requiring '{}' from {}",
            name,
            path.display()
        );
        self.cache
            .insert(name.to_string(), CacheEntry::InProgress);
        let tokens: Vec<Token> = Lexer::new(&source).skip_comments(true).collect();
        let mut parser = Parser::new(tokens, source.len(), self);
        let tree = parser.parse_program(false)?;
        self.cache
            .insert(name.to_string(), CacheEntry::Done(tree.clone()));
        Ok(tree)
    }
}

fn with_ext(name: &str) -> PathBuf {
    if name.ends_with(SOURCE_EXT) {
        PathBuf::from(name)
    } else {
        PathBuf::from(format!("{}{}", name, SOURCE_EXT))
    }
}

/// The compiler's own standard-library directory, always searched after
/// the caller-supplied include paths.
fn stdlib_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("lib")
}
