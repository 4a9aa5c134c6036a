use ryb_parser::{Options, Resolver};
use ryb_runtime::class::{MethodId, Slot, HEADER_SLOTS};
use ryb_runtime::universe::Universe;

fn build(source: &str) -> Universe {
    let mut resolver = Resolver::new(Options {
        skip_bootstrap: true,
        ..Options::default()
    });
    let program =
        ryb_parser::parse_program(source, &mut resolver).expect("input did not parse successfully");
    Universe::build(&program).expect("hierarchy did not build")
}

#[test]
fn builds_hierarchy_and_vtables_test() {
    let universe = build(
        "class Bar\ndef m\n1\nend\nend\nclass Foo < Bar\ndef m\n2\nend\ndef n\n3\nend\nend",
    );
    assert_eq!(universe.total_slots(), HEADER_SLOTS + 2);

    let bar = universe.class_named("Bar").expect("Bar missing");
    let foo = universe.class_named("Foo").expect("Foo missing");
    assert_eq!(universe.arena[foo].super_class, Some(bar));

    let m = universe.offset_of("m").expect("no offset for m");
    let n = universe.offset_of("n").expect("no offset for n");
    assert_eq!(m, HEADER_SLOTS);
    assert_eq!(n, HEADER_SLOTS + 1);

    // Foo overrode m; Bar never defined n.
    assert_eq!(universe.arena[bar].entry(m), Slot::Method(MethodId(0)));
    assert_eq!(universe.arena[foo].entry(m), Slot::Method(MethodId(1)));
    assert_eq!(universe.arena[bar].entry(n), Slot::Fallback(n));
    assert_eq!(universe.arena[foo].entry(n), Slot::Method(MethodId(2)));
}

#[test]
fn reopening_propagates_to_live_subclasses_test() {
    let universe = build("class A\nend\nclass B < A\nend\nclass A\ndef x\n1\nend\nend");
    let a = universe.class_named("A").expect("A missing");
    let b = universe.class_named("B").expect("B missing");
    let x = universe.offset_of("x").expect("no offset for x");

    // Reopening reused A's record: Object, Class, A, B.
    assert_eq!(universe.arena.len(), 4);
    assert_eq!(universe.arena[a].entry(x), Slot::Method(MethodId(0)));
    assert_eq!(universe.arena[b].entry(x), Slot::Method(MethodId(0)));
}

#[test]
fn override_survives_superclass_redefinition_test() {
    let universe = build(
        "class A\ndef x\n1\nend\nend\nclass B < A\ndef x\n2\nend\nend\nclass A\ndef x\n3\nend\nend",
    );
    let a = universe.class_named("A").expect("A missing");
    let b = universe.class_named("B").expect("B missing");
    let x = universe.offset_of("x").expect("no offset for x");

    assert_eq!(universe.arena[a].entry(x), Slot::Method(MethodId(2)));
    assert_eq!(universe.arena[b].entry(x), Slot::Method(MethodId(1)));
}

#[test]
fn unknown_superclass_is_an_error_test() {
    let mut resolver = Resolver::new(Options {
        skip_bootstrap: true,
        ..Options::default()
    });
    let program = ryb_parser::parse_program("class Foo < Missing\nend", &mut resolver)
        .expect("input did not parse successfully");
    let err = Universe::build(&program).expect_err("hierarchy built unexpectedly");
    assert!(
        err.to_string().contains("unknown superclass 'Missing'"),
        "{}",
        err
    );
}

#[test]
fn module_defaults_to_object_test() {
    let universe = build("module Helper\ndef h\n1\nend\nend");
    let helper = universe.class_named("Helper").expect("Helper missing");
    assert_eq!(
        universe.arena[helper].super_class,
        Some(universe.core.object_class)
    );
}

#[test]
fn bootstrap_core_reopens_the_root_classes_test() {
    let mut resolver = Resolver::new(Options::default());
    let program = ryb_parser::parse_program("class Point\nend", &mut resolver)
        .expect("input did not parse successfully");
    let universe = Universe::build(&program).expect("hierarchy did not build");

    let object = universe.core.object_class;
    let nil_p = universe.offset_of("nil?").expect("no offset for nil?");
    assert!(matches!(
        universe.arena[object].entry(nil_p),
        Slot::Method(_)
    ));

    // A user class created after the core inherits its method slots.
    let point = universe.class_named("Point").expect("Point missing");
    assert_eq!(
        universe.arena[point].entry(nil_p),
        universe.arena[object].entry(nil_p)
    );
}
