//! The collection of all classes known to one compilation run.
//!
//! This is the driver that turns a parsed program into a live class
//! hierarchy: it assigns vtable offsets to method selectors, allocates a
//! class object per definition, and writes every method definition into
//! the dispatch tables.

use anyhow::{anyhow, Result};
use indexmap::IndexMap;

use ryb_core::ast::{ClassName, Expr, ExprKind, MethodName};

use crate::class::{ClassArena, ClassId, MethodId, Slot, HEADER_SLOTS};
use crate::interner::{Interner, Selector};

/// A method installed into a class's vtable.
#[derive(Debug, Clone)]
pub struct Method {
    pub selector: Selector,
    /// The class the definition appeared in.
    pub holder: ClassId,
}

/// The classes every hierarchy starts from.
///
/// Keeping direct handles means later definitions cannot displace them.
#[derive(Debug)]
pub struct CoreClasses {
    /// The **Object** class, the root of the hierarchy.
    pub object_class: ClassId,
    /// The **Class** class, the class of every class object.
    pub class_class: ClassId,
}

/// The complete object-model state of one compilation run.
#[derive(Debug)]
pub struct Universe {
    /// The arena owning every class object.
    pub arena: ClassArena,
    /// The selector interner.
    pub interner: Interner,
    /// The vtable offset for each known selector, in first-appearance
    /// order; offsets start right after the header slots.
    pub selectors: IndexMap<Selector, usize>,
    /// Every installed method, in installation order.
    pub methods: Vec<Method>,
    /// The known classes by name, in definition order.
    pub classes: IndexMap<String, ClassId>,
    /// The bootstrap classes.
    pub core: CoreClasses,
    total_slots: usize,
}

impl Universe {
    /// Build the class hierarchy for a parsed program.
    ///
    /// A first pass over the tree assigns one vtable offset per distinct
    /// method selector. Every class object of the run is then allocated
    /// with the same total slot count, and each method definition is
    /// written into its class's vtable, propagating to still-inheriting
    /// subclasses.
    pub fn build(program: &Expr) -> Result<Universe> {
        let mut interner = Interner::default();
        let mut selectors = IndexMap::new();
        collect_selectors(program, &mut interner, &mut selectors);
        let total_slots = HEADER_SLOTS + selectors.len();

        let mut arena = ClassArena::new();
        let object_class = arena.create_class("Object", total_slots, None, None);
        let class_class = arena.create_class("Class", total_slots, Some(object_class), None);
        // During bootstrap, Class is its own class.
        arena.set_metaclass(class_class, class_class);
        arena.set_metaclass(object_class, class_class);

        let mut classes = IndexMap::new();
        classes.insert(String::from("Object"), object_class);
        classes.insert(String::from("Class"), class_class);

        let mut universe = Universe {
            arena,
            interner,
            selectors,
            methods: Vec::new(),
            classes,
            core: CoreClasses {
                object_class,
                class_class,
            },
            total_slots,
        };
        universe.walk(program)?;
        Ok(universe)
    }

    /// The total slot count shared by every class object of this run.
    pub fn total_slots(&self) -> usize {
        self.total_slots
    }

    /// Look up a class by name.
    pub fn class_named(&self, name: &str) -> Option<ClassId> {
        self.classes.get(name).copied()
    }

    /// The vtable offset assigned to a selector name, if any definition
    /// in the program used it.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.selectors
            .iter()
            .find(|(selector, _)| self.interner.lookup(**selector) == name)
            .map(|(_, offset)| *offset)
    }

    fn walk(&mut self, expr: &Expr) -> Result<()> {
        match &expr.kind {
            ExprKind::Do(exprs) | ExprKind::List(exprs) => {
                for expr in exprs {
                    self.walk(expr)?;
                }
            }
            ExprKind::Required(tree) => self.walk(tree)?,
            ExprKind::ClassDef {
                name,
                super_class,
                body,
                ..
            } => self.define_class(name, super_class, body)?,
            _ => {}
        }
        Ok(())
    }

    fn define_class(&mut self, name: &ClassName, super_name: &str, body: &[Expr]) -> Result<()> {
        let name = match name {
            ClassName::Named(name) => name.clone(),
            // A singleton-class body reopens a metaclass; that is a later
            // compiler phase, not part of building the hierarchy.
            ClassName::Singleton => return Ok(()),
        };
        let super_id = self.class_named(super_name).ok_or_else(|| {
            anyhow!("unknown superclass '{}' for class '{}'", super_name, name)
        })?;
        let id = match self.class_named(&name) {
            // Reopening an existing class reuses its record; the
            // hierarchy is append-only.
            Some(id) => id,
            None => {
                let id = self.arena.create_class(
                    name.clone(),
                    self.total_slots,
                    Some(super_id),
                    Some(self.core.class_class),
                );
                self.classes.insert(name, id);
                id
            }
        };
        for expr in body {
            match &expr.kind {
                ExprKind::Defm {
                    name: MethodName::Simple(selector),
                    ..
                } => self.install_method(id, selector.clone()),
                // Singleton methods (def recv.name) belong to a later phase.
                ExprKind::Defm { .. } => {}
                _ => self.walk(expr)?,
            }
        }
        Ok(())
    }

    fn install_method(&mut self, class: ClassId, selector: String) {
        let selector = self.interner.intern(&selector);
        let offset = self.selectors[&selector];
        let method = MethodId(self.methods.len() as u32);
        self.methods.push(Method {
            selector,
            holder: class,
        });
        self.arena.set_vtable_entry(class, offset, Slot::Method(method));
    }
}

/// First pass over the tree: assign one vtable offset per distinct method
/// selector, in first-appearance order.
fn collect_selectors(
    expr: &Expr,
    interner: &mut Interner,
    selectors: &mut IndexMap<Selector, usize>,
) {
    match &expr.kind {
        ExprKind::Do(exprs) | ExprKind::List(exprs) => {
            for expr in exprs {
                collect_selectors(expr, interner, selectors);
            }
        }
        ExprKind::Required(tree) => collect_selectors(tree, interner, selectors),
        ExprKind::ClassDef { body, .. } => {
            for expr in body {
                collect_selectors(expr, interner, selectors);
            }
        }
        ExprKind::Defm {
            name: MethodName::Simple(name),
            ..
        } => {
            let selector = interner.intern(name);
            let next = HEADER_SLOTS + selectors.len();
            selectors.entry(selector).or_insert(next);
        }
        _ => {}
    }
}
