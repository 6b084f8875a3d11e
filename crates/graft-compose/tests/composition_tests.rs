//! Type composition integration tests
//!
//! Covers dependency merging through the composed type surface, static
//! property resolution, construction order, construction failures, and the
//! end-to-end injection scenario.

use graft_compose::{compose, compose_type, enhance};
use graft_core::{
    CallError, PropertyDescriptor, Token, TypeDef, TypeProtocol, TypeRef, Value, DEPENDENCIES_KEY,
};
use std::sync::{Arc, Mutex};

type ArgLog = Arc<Mutex<Vec<Vec<Value>>>>;

fn new_args() -> ArgLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn recording_type(name: &str, tokens: Vec<Token>, received: &ArgLog) -> TypeRef {
    let received = received.clone();
    TypeRef::from(
        TypeDef::builder(name)
            .dependencies(tokens)
            .constructor(move |_obj, args| {
                received.lock().unwrap().push(args.to_vec());
                Ok(())
            })
            .build(),
    )
}

fn names(tokens: &[&str]) -> Vec<Token> {
    tokens.iter().map(|t| Token::name(*t)).collect()
}

fn strs(values: &[&str]) -> Vec<Value> {
    values.iter().map(|v| Value::str(*v)).collect()
}

#[test]
fn test_composed_dependencies_deduplicate_in_order() {
    let base = recording_type("Doc", names(&["db", "router"]), &new_args());
    let enh = recording_type("Audit", names(&["router", "log"]), &new_args());

    let composed = compose(base, enh);
    assert_eq!(
        composed.merged().combined(),
        names(&["db", "router", "log"]).as_slice()
    );

    let composed = TypeRef::from(composed);
    assert_eq!(composed.dependencies(), names(&["db", "router", "log"]).as_slice());
}

#[test]
fn test_dependencies_static_property_and_descriptor() {
    let base = TypeRef::from(TypeDef::builder("Doc").build());
    let enh = recording_type("Audit", names(&["log"]), &new_args());
    let composed = TypeRef::from(compose(base, enh));

    // Present even though the base declared nothing.
    assert_eq!(
        composed.static_property(DEPENDENCIES_KEY),
        Some(Value::list(vec![Value::str("log")]))
    );

    let descriptor: PropertyDescriptor = composed.static_descriptor(DEPENDENCIES_KEY).unwrap();
    assert!(!descriptor.writable);
    assert!(descriptor.enumerable);
    assert!(descriptor.configurable);
    assert_eq!(descriptor.value, Value::list(vec![Value::str("log")]));
}

#[test]
fn test_dependencies_static_shadows_unrelated_statics() {
    let base = TypeRef::from(
        TypeDef::builder("Doc")
            .static_property(DEPENDENCIES_KEY, Value::str("bogus"))
            .build(),
    );
    let enh = recording_type("Audit", names(&["log"]), &new_args());
    let composed = TypeRef::from(compose(base, enh));

    assert_eq!(
        composed.static_property(DEPENDENCIES_KEY),
        Some(Value::list(vec![Value::str("log")]))
    );
}

#[test]
fn test_other_statics_reflect_the_base_never_the_enhancement() {
    let base = TypeRef::from(
        TypeDef::builder("Doc")
            .static_property("version", Value::Int(1))
            .build(),
    );
    let enh = TypeRef::from(
        TypeDef::builder("Audit")
            .static_property("version", Value::Int(2))
            .static_property("extra", Value::Int(3))
            .build(),
    );
    let composed = TypeRef::from(compose(base, enh));

    assert_eq!(composed.static_property("version"), Some(Value::Int(1)));
    assert_eq!(composed.static_property("extra"), None);
    assert_eq!(
        composed.static_descriptor("version").map(|d| d.value),
        Some(Value::Int(1))
    );
}

#[test]
fn test_end_to_end_injection_scenario() {
    // Base [A, C, E, F], enhancement [A, B, D, E] -> combined [A, C, E, F, B, D].
    let base_args = new_args();
    let enh_args = new_args();
    let base = recording_type("Doc", names(&["A", "C", "E", "F"]), &base_args);
    let enh = recording_type("Audit", names(&["A", "B", "D", "E"]), &enh_args);

    let composed = TypeRef::from(compose(base, enh));
    assert_eq!(
        composed.dependencies(),
        names(&["A", "C", "E", "F", "B", "D"]).as_slice()
    );

    let instance = composed
        .construct(&strs(&["a", "c", "e", "f", "b", "d"]))
        .unwrap();

    let base_received = base_args.lock().unwrap().clone();
    assert_eq!(base_received, vec![strs(&["a", "c", "e", "f"])]);

    // The enhancement receives the base instance ahead of its own share,
    // with the shared tokens resolved to the same values as the base's.
    let enh_received = enh_args.lock().unwrap().clone();
    assert_eq!(enh_received.len(), 1);
    let received = &enh_received[0];
    assert_eq!(received.len(), 5);
    let first = received[0].as_object().cloned().unwrap();
    assert_eq!(first, instance);
    assert_eq!(&received[1..], strs(&["a", "b", "d", "e"]).as_slice());
}

#[test]
fn test_base_construction_failure_skips_the_enhancement() {
    let enh_args = new_args();
    let base = TypeRef::from(
        TypeDef::builder("Doc")
            .constructor(|_obj, _args| Err(CallError::thrown("no database")))
            .build(),
    );
    let enh = recording_type("Audit", Vec::new(), &enh_args);

    let err = TypeRef::from(compose(base, enh)).construct(&[]).unwrap_err();
    match err {
        CallError::Construction { type_name, .. } => assert_eq!(type_name, "Doc"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(enh_args.lock().unwrap().is_empty());
}

#[test]
fn test_enhancement_construction_failure_aborts_composition() {
    let base_args = new_args();
    let base = recording_type("Doc", Vec::new(), &base_args);
    let enh = TypeRef::from(
        TypeDef::builder("Audit")
            .constructor(|_obj, _args| Err(CallError::thrown("no log sink")))
            .build(),
    );

    let err = TypeRef::from(compose(base, enh)).construct(&[]).unwrap_err();
    match err {
        CallError::Construction { type_name, .. } => assert_eq!(type_name, "Audit"),
        other => panic!("unexpected error: {:?}", other),
    }
    // The base had already been constructed when the enhancement failed.
    assert_eq!(base_args.lock().unwrap().len(), 1);
}

#[test]
fn test_chained_composition_merges_across_layers() {
    let base = recording_type("Doc", names(&["db"]), &new_args());
    let enh_a = recording_type("A", names(&["db", "log"]), &new_args());
    let enh_b = recording_type("B", names(&["log", "net"]), &new_args());

    let composed = compose_type(base, [enh_a, enh_b]);
    assert_eq!(
        composed.dependencies(),
        names(&["db", "log", "net"]).as_slice()
    );
}

#[test]
fn test_nested_composition_constructs_every_layer() {
    let base_args = new_args();
    let a_args = new_args();
    let b_args = new_args();
    let base = recording_type("Doc", names(&["db"]), &base_args);
    let enh_a = recording_type("A", names(&["log"]), &a_args);
    let enh_b = recording_type("B", names(&["net"]), &b_args);

    let composed = compose_type(base, [enh_a, enh_b]);
    let instance = composed
        .construct(&strs(&["DB", "LOG", "NET"]))
        .unwrap();

    assert_eq!(*base_args.lock().unwrap(), vec![strs(&["DB"])]);

    // Each enhancement receives its layer's base instance first; the inner
    // layer's view shares the original base's identity.
    let a_received = a_args.lock().unwrap().clone();
    assert_eq!(a_received.len(), 1);
    assert!(a_received[0][0].as_object().is_some());
    assert_eq!(&a_received[0][1..], strs(&["LOG"]).as_slice());

    let b_received = b_args.lock().unwrap().clone();
    assert_eq!(b_received.len(), 1);
    let b_base = b_received[0][0].as_object().cloned().unwrap();
    assert_eq!(b_base, instance);
    assert_eq!(&b_received[0][1..], strs(&["NET"]).as_slice());
}

#[test]
fn test_enhance_decorator_matches_direct_composition() {
    let direct = compose_type(
        recording_type("Doc", names(&["db"]), &new_args()),
        [
            recording_type("A", names(&["log"]), &new_args()),
            recording_type("B", names(&["net"]), &new_args()),
        ],
    );

    let transform = enhance([
        recording_type("A", names(&["log"]), &new_args()),
        recording_type("B", names(&["net"]), &new_args()),
    ]);
    let decorated = transform(recording_type("Doc", names(&["db"]), &new_args()));

    assert_eq!(direct.dependencies(), decorated.dependencies());
    assert_eq!(direct.name(), decorated.name());
}

#[test]
fn test_composed_type_reports_both_sides() {
    let base = recording_type("Doc", names(&["db"]), &new_args());
    let enh = recording_type("Audit", names(&["log"]), &new_args());
    let composed = compose(base.clone(), enh.clone());

    assert_eq!(composed.base(), &base);
    assert_eq!(composed.enhancement(), &enh);
    assert_eq!(composed.name(), "Doc+Audit");
    assert_eq!(composed.merged().base_len(), 1);
    assert_eq!(composed.merged().enh_len(), 1);
}
