mod common;

use common::{assert_equivalent, at, record};
use facsimile::value::{Callable, ErrorObject, Instant, MapValue, Pattern, Record, SetValue};
use facsimile::{Category, Value};

#[test]
fn flat_record() {
    let input = record(vec![
        ("a", Value::from(1)),
        ("b", Value::from("c")),
        ("c", Value::from(true)),
        ("d", Value::symbol("a")),
        ("e", Value::Null),
        ("f", Value::Undefined),
    ]);
    let copy = facsimile::duplicate(&input).unwrap();

    assert_equivalent(&input, &copy);
    assert_eq!(at(&copy, "d").to_string(), "Symbol(a)");
}

#[test]
fn deeply_nested_record() {
    let input = record(vec![
        (
            "a",
            record(vec![
                ("b", Value::from(1)),
                (
                    "c",
                    record(vec![
                        ("d", Value::Callable(Callable::new("d", "() => {}", |_| Value::Undefined))),
                        ("e", Value::sequence([Value::from(1), Value::from(2), Value::from("b")])),
                    ]),
                ),
            ]),
        ),
        (
            "f",
            Value::sequence([
                Value::from(4),
                Value::from(true),
                record(vec![
                    ("g", Value::from("b")),
                    ("h", Value::Error(ErrorObject::generic("ddd"))),
                ]),
            ]),
        ),
        ("i", Value::Instant(Instant::parse("2016-15-14"))),
        (
            "j",
            record(vec![(
                "k",
                record(vec![(
                    "l",
                    record(vec![("m", record(vec![("n", Value::Pattern(Pattern::new("def", "").unwrap()))]))]),
                )]),
            )]),
        ),
    ]);
    let copy = facsimile::duplicate(&input).unwrap();

    assert_equivalent(&input, &copy);
    assert_eq!(at(&copy, "a.c.e.2").as_text(), Some("b"));
    assert_eq!(at(&copy, "f.2.h").to_string(), "Error: ddd");
    assert_eq!(at(&copy, "i").to_string(), "Invalid Date");
    assert!(!at(&copy, "f.2.h").same_value(&at(&input, "f.2.h")));
    assert!(!at(&copy, "j.k.l.m.n").same_value(&at(&input, "j.k.l.m.n")));
}

#[test]
fn nested_scenario_shares_only_the_symbol() {
    let symbol = Value::symbol("s");
    let input = record(vec![(
        "a",
        record(vec![("b", Value::sequence([Value::from(1), Value::from(2), symbol.clone()]))]),
    )]);
    let copy = facsimile::duplicate(&input).unwrap();

    assert!(!copy.same_value(&input));
    assert!(!at(&copy, "a").same_value(&at(&input, "a")));
    assert!(!at(&copy, "a.b").same_value(&at(&input, "a.b")));
    assert_eq!(at(&copy, "a.b.0").as_number(), Some(1.0));
    assert_eq!(at(&copy, "a.b.1").as_number(), Some(2.0));
    assert!(at(&copy, "a.b.2").same_value(&symbol));
}

#[test]
fn sequence_order_and_holes_are_preserved() {
    let input = Value::sequence([Value::from("x"), Value::Undefined, Value::from(3)]);
    let copy = facsimile::duplicate(&input).unwrap();

    assert_equivalent(&input, &copy);
    assert_eq!(copy.as_sequence().unwrap().len(), 3);
}

#[test]
fn hidden_properties_are_not_copied() {
    let source = Record::from_entries([("visible", Value::from(1))]);
    source.define_hidden("hidden", Value::from(2));
    let copy = facsimile::duplicate(&Value::Record(source)).unwrap();

    let copy = copy.as_record().unwrap();
    assert!(copy.contains_key("visible"));
    assert!(!copy.contains_key("hidden"));
}

#[test]
fn copies_are_independent_of_the_source() {
    let input = record(vec![("list", Value::sequence([Value::from(1)]))]);
    let copy = facsimile::duplicate(&input).unwrap();

    at(&copy, "list").as_sequence().unwrap().push(Value::from(2));
    input.as_record().unwrap().set("added", Value::from(true));

    assert_eq!(at(&input, "list").as_sequence().unwrap().len(), 1);
    assert!(!copy.as_record().unwrap().contains_key("added"));
}

#[test]
fn maps_are_copied_shallowly() {
    let keys = [
        Value::record(Vec::<(&str, Value)>::new()),
        Value::Callable(Callable::new("f", "() => {}", |_| Value::Undefined)),
        Value::sequence([Value::from(1), Value::from(2), Value::from(3)]),
    ];
    let input = MapValue::from_entries(keys.iter().cloned().zip(["a", "b", "c"].map(Value::from)));
    let copy = facsimile::duplicate(&Value::Map(input.clone())).unwrap();

    let Value::Map(copy) = copy else {
        panic!("expected a map");
    };
    assert!(!copy.ptr_eq(&input));
    assert_eq!(copy.len(), 3);
    for key in &keys {
        let original = input.get(key).unwrap();
        assert!(copy.get(key).unwrap().same_value(&original));
    }
}

#[test]
fn sets_are_copied_shallowly() {
    let members = [
        Value::record(Vec::<(&str, Value)>::new()),
        Value::Callable(Callable::new("f", "() => {}", |_| Value::Undefined)),
        Value::sequence([Value::from(1)]),
        Value::from("a"),
    ];
    let input = SetValue::from_values(members.clone());
    let copy = facsimile::duplicate(&Value::Set(input.clone())).unwrap();

    assert_eq!(copy.category(), Category::Set);
    let Value::Set(copy) = copy else {
        panic!("expected a set");
    };
    assert!(!copy.ptr_eq(&input));
    for member in &members {
        assert!(copy.has(member));
    }
}
