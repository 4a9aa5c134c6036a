//! Class objects and their dispatch tables.
//!
//! Every class object occupies six header slots (metaclass, reserved,
//! name, superclass, subclass-list head, next sibling) followed by its
//! vtable, one slot per dispatchable method offset. Here the header slots
//! are typed fields of an arena record and the sibling links collapse into
//! an owned child list per record; [`ClassArena::raw_words`] reproduces
//! the flat slot ordering that generated code dispatches against.

use std::fmt;
use std::ops::Index;

/// Number of header slots preceding the vtable region.
pub const HEADER_SLOTS: usize = 6;

/// A stable handle to a class record in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(u32);

impl ClassId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A handle to an installed method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodId(pub u32);

/// One vtable entry.
///
/// A slot that no class along the inheritance chain has claimed holds a
/// fallback keyed by its own offset, so a dispatch through it can still
/// report which selector was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Method(MethodId),
    Fallback(usize),
}

/// A class record.
#[derive(Debug, Clone)]
pub struct Class {
    pub name: String,
    /// The class of this class (header slot 0).
    pub metaclass: Option<ClassId>,
    /// The superclass (header slot 3); only the hierarchy root has none.
    pub super_class: Option<ClassId>,
    /// Direct subclasses, newest first: creation pushes at the head, so
    /// iteration order is the reverse of creation order.
    pub subclasses: Vec<ClassId>,
    vtable: Vec<Slot>,
}

impl Class {
    /// Total slot count, header included.
    pub fn total_slots(&self) -> usize {
        HEADER_SLOTS + self.vtable.len()
    }

    /// The vtable region, indexed from offset [`HEADER_SLOTS`].
    pub fn vtable(&self) -> &[Slot] {
        &self.vtable
    }

    /// The entry at a vtable offset (`HEADER_SLOTS <= offset < total_slots`).
    pub fn entry(&self, offset: usize) -> Slot {
        self.vtable[offset - HEADER_SLOTS]
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// One machine word of the emitted class-object layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawWord {
    /// The sentinel "none" value.
    Null,
    /// A pointer to another class object.
    ClassRef(ClassId),
    /// A pointer to the display name of the given class.
    NameRef(ClassId),
    /// A pointer to an installed method.
    Method(MethodId),
    /// A pointer into the shared dispatch-fallback thunk table.
    Fallback(usize),
}

/// The arena owning every class object of one compilation run.
///
/// Records are never removed or re-parented; the hierarchy only grows.
#[derive(Debug, Default)]
pub struct ClassArena {
    classes: Vec<Class>,
}

impl ClassArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, id: ClassId) -> &Class {
        &self.classes[id.index()]
    }

    fn get_mut(&mut self, id: ClassId) -> &mut Class {
        &mut self.classes[id.index()]
    }

    /// Allocate a class object under `super_class`.
    ///
    /// The superclass's vtable is copied verbatim, the remaining slots up
    /// to `total_slots` are filled with dispatch fallbacks, and the new
    /// class is pushed at the head of the superclass's subclass list, so
    /// it is discoverable from its superclass immediately.
    ///
    /// The inherited slot count is read off the superclass record rather
    /// than passed in, so it cannot disagree with the superclass's actual
    /// size; `total_slots` must not shrink below it.
    pub fn create_class(
        &mut self,
        name: impl Into<String>,
        total_slots: usize,
        super_class: Option<ClassId>,
        metaclass: Option<ClassId>,
    ) -> ClassId {
        let inherited = super_class
            .map(|id| self.get(id).total_slots())
            .unwrap_or(HEADER_SLOTS);
        debug_assert!(total_slots >= inherited);
        let mut vtable = Vec::with_capacity(total_slots.saturating_sub(HEADER_SLOTS));
        if let Some(super_id) = super_class {
            vtable.extend_from_slice(self.get(super_id).vtable());
        }
        for offset in (HEADER_SLOTS + vtable.len())..total_slots {
            vtable.push(Slot::Fallback(offset));
        }
        let id = ClassId(self.classes.len() as u32);
        self.classes.push(Class {
            name: name.into(),
            metaclass,
            super_class,
            subclasses: Vec::new(),
            vtable,
        });
        if let Some(super_id) = super_class {
            self.get_mut(super_id).subclasses.insert(0, id);
        }
        id
    }

    /// Patch a metaclass link established after the fact (the bootstrap
    /// classes exist before the class of classes does).
    pub fn set_metaclass(&mut self, id: ClassId, metaclass: ClassId) {
        self.get_mut(id).metaclass = Some(metaclass);
    }

    /// Write `entry` into `class`'s vtable at `offset`, propagating it to
    /// every descendant that is still inheriting this slot.
    ///
    /// The old value is captured before anything is mutated, every
    /// subclass is compared against it, and the class's own slot is
    /// written only after its whole subtree has been visited: a subclass
    /// holding anything else has its own override, and neither it nor
    /// anything below it is touched.
    pub fn set_vtable_entry(&mut self, class: ClassId, offset: usize, entry: Slot) {
        let index = offset - HEADER_SLOTS;
        let old = self.get(class).vtable[index];
        let subclasses = self.get(class).subclasses.clone();
        for subclass in subclasses {
            if self.get(subclass).vtable[index] == old {
                self.set_vtable_entry(subclass, offset, entry);
            }
        }
        self.get_mut(class).vtable[index] = entry;
    }

    /// The class following `id` in its superclass's subclass list (header
    /// slot 5), if any.
    pub fn next_sibling(&self, id: ClassId) -> Option<ClassId> {
        let super_id = self.get(id).super_class?;
        let siblings = &self.get(super_id).subclasses;
        let at = siblings.iter().position(|&sibling| sibling == id)?;
        siblings.get(at + 1).copied()
    }

    /// Emit the flat slot layout of a class object, in the exact order
    /// generated code sees it: the six header slots, then the vtable.
    pub fn raw_words(&self, id: ClassId) -> Vec<RawWord> {
        let class = self.get(id);
        let class_ref = |link: Option<ClassId>| link.map(RawWord::ClassRef).unwrap_or(RawWord::Null);
        let mut words = vec![
            class_ref(class.metaclass),
            RawWord::Null,
            RawWord::NameRef(id),
            class_ref(class.super_class),
            class_ref(class.subclasses.first().copied()),
            class_ref(self.next_sibling(id)),
        ];
        for slot in class.vtable() {
            words.push(match *slot {
                Slot::Method(method) => RawWord::Method(method),
                Slot::Fallback(offset) => RawWord::Fallback(offset),
            });
        }
        words
    }
}

impl Index<ClassId> for ClassArena {
    type Output = Class;

    fn index(&self, id: ClassId) -> &Class {
        self.get(id)
    }
}
