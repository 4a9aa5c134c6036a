//!
//! The runtime object model for the Ryb bootstrap compiler.
//!
//! Class objects live in an arena and form a single-inheritance tree with
//! vtable-based method dispatch. The hierarchy is live: redefining a
//! method on a class patches the dispatch tables of every descendant that
//! has not overridden it, without disturbing those that have.
//!

/// Facilities for manipulating class objects and their vtables.
pub mod class;
/// Facilities for selector interning.
pub mod interner;
/// The collection of all classes known to one compilation run.
pub mod universe;
