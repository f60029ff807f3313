//! Unit tests for constructor descriptors

use wireup_domain::{Constructor, Field, Location, Slot, TypeKey, Value};

#[test]
fn test_builder_collects_slots_in_order() {
    let descriptor = Constructor::builder(Location::new("keeper"))
        .input(TypeKey::of::<u8>())
        .input_slot(Slot::Struct {
            type_name: "Args",
            fields: vec![
                Field::new("a", TypeKey::of::<u16>()),
                Field::new("b", TypeKey::of::<u32>()),
            ],
        })
        .output(TypeKey::of::<String>())
        .call(|values| {
            let count: u8 = values.into_iter().next().ok_or("no input")?.into_one()?;
            Ok(vec![Value::one(count.to_string())])
        });

    assert_eq!(descriptor.inputs.len(), 2);
    assert_eq!(descriptor.inputs[1].width(), 2);
    assert_eq!(descriptor.outputs, vec![Slot::Key(TypeKey::of::<String>())]);

    let outputs = descriptor
        .invoke(vec![Value::one(7_u8), Value::Fields(Vec::new())])
        .unwrap();
    assert_eq!(outputs[0].clone().into_one::<String>().unwrap(), "7");
}

#[test]
fn test_location_display() {
    assert_eq!(Location::new("provide").to_string(), "provide");

    let located = Location::caller("provide");
    assert_eq!(located.file(), Some(file!()));
    assert!(located.line() > 0);
    assert!(located.to_string().starts_with("provide ("));
}
