use facsimile::value::{CompiledModule, Generator, OpaqueConstant, SerializedPayload, WeakMapValue, WeakSetValue};
use facsimile::{Category, Value};

#[test]
fn primitives_come_back_unchanged() {
    let inputs = [
        Value::Undefined,
        Value::Null,
        Value::from(true),
        Value::from(1),
        Value::Number(-0.0),
        Value::Number(f64::NAN),
        Value::from("abc"),
    ];

    for input in &inputs {
        let copy = facsimile::duplicate(input).unwrap();
        assert!(copy.same_value(input), "{input} changed");
    }
}

#[test]
fn symbols_keep_their_identity() {
    let symbol = Value::symbol("a");
    let copy = facsimile::duplicate(&symbol).unwrap();

    assert!(copy.same_value(&symbol));
    assert_eq!(copy.to_string(), "Symbol(a)");
}

#[test]
fn opaque_handles_are_shared() {
    let inputs = [
        Value::Opaque(OpaqueConstant::math()),
        Value::Serialized(SerializedPayload::new(serde_json::json!({ "a": 1 }))),
        Value::Generator(Generator::new(vec![Value::from(1), Value::from(2)])),
        Value::Module(CompiledModule::new("add", vec![0u8, 97, 115, 109])),
        Value::WeakMap(WeakMapValue::new()),
        Value::WeakSet(WeakSetValue::new()),
    ];

    for input in &inputs {
        let copy = facsimile::duplicate(input).unwrap();
        assert!(copy.same_value(input), "{} was copied", input.category());
    }
}

#[test]
fn math_namespace_is_a_single_handle() {
    let math = OpaqueConstant::math();
    assert!(math.ptr_eq(&OpaqueConstant::math()));
    assert_eq!(math.get("PI").and_then(|pi| pi.as_number()), Some(std::f64::consts::PI));
    assert_eq!(Value::Opaque(math).category(), Category::Opaque);
}

#[test]
fn shared_generator_advances_for_every_handle() {
    let generator = Value::Generator(Generator::new(vec![Value::from(1), Value::from(2)]));
    let copy = facsimile::duplicate(&generator).unwrap();

    let (Value::Generator(original), Value::Generator(copy)) = (&generator, &copy) else {
        panic!("expected generators");
    };
    assert_eq!(original.next_value().and_then(|v| v.as_number()), Some(1.0));
    assert_eq!(copy.next_value().and_then(|v| v.as_number()), Some(2.0));
    assert!(original.next_value().is_none());
}
