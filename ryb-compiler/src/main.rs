//!
//! This is the front end of the Ryb bootstrap compiler.
//!
//! It parses a program (statically inlining its requires), prints the
//! resulting tree on demand, and builds the class hierarchy with its
//! method-dispatch tables.
//!
#![warn(missing_docs)]

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ryb_core::span::line_col;
use ryb_parser::{Options as ResolveOptions, Resolver};
use ryb_runtime::class::Slot;
use ryb_runtime::universe::Universe;

#[derive(Debug, Clone, PartialEq, Parser)]
#[clap(about, author)]
struct Options {
    /// Program file to compile.
    #[clap(name = "FILE")]
    file: PathBuf,

    /// Set search path for required sources.
    #[clap(short = 'I', long)]
    include: Vec<PathBuf>,

    /// Do not statically include the bootstrap core sources.
    #[clap(long)]
    bare: bool,

    /// Defer all requires instead of statically inlining them.
    #[clap(long)]
    defer_requires: bool,

    /// Print the parsed tree.
    #[clap(long, short = 'd')]
    dump_ast: bool,

    /// Print the class hierarchy and its method slots.
    #[clap(long, short = 'c')]
    classes: bool,
}

fn main() -> anyhow::Result<()> {
    let opts: Options = Options::parse();

    let source = fs::read_to_string(&opts.file)
        .with_context(|| format!("could not read {}", opts.file.display()))?;

    let mut resolver = Resolver::new(ResolveOptions {
        include_paths: opts.include.clone(),
        skip_bootstrap: opts.bare,
        defer_requires: opts.defer_requires,
    });

    let program = match ryb_parser::parse_program(&source, &mut resolver) {
        Ok(program) => program,
        Err(err) => {
            let (line, col) = line_col(&source, err.pos);
            anyhow::bail!("{}:{}:{}: {}", opts.file.display(), line, col, err.message);
        }
    };

    if opts.dump_ast {
        println!("{}", program);
    }

    let universe = Universe::build(&program)?;

    if opts.classes {
        print_classes(&universe);
    }

    if !opts.dump_ast && !opts.classes {
        println!(
            "{}: {} classes, {} methods, {} vtable slots per class",
            opts.file.display(),
            universe.classes.len(),
            universe.methods.len(),
            universe.total_slots(),
        );
    }

    Ok(())
}

/// One line per class, with the method slots its own definitions claimed.
fn print_classes(universe: &Universe) {
    for (name, &id) in &universe.classes {
        let class = &universe.arena[id];
        match class.super_class {
            Some(super_id) => println!("{} < {}", name, universe.arena[super_id].name),
            None => println!("{}", name),
        }
        for (&selector, &offset) in &universe.selectors {
            let own = match class.entry(offset) {
                Slot::Method(method) => universe.methods[method.0 as usize].holder == id,
                Slot::Fallback(_) => false,
            };
            if own {
                println!("  #{:<3} {}", offset, universe.interner.lookup(selector));
            }
        }
    }
}
