//! End-to-end tests for derived aggregates.
//!
//! Every test builds its own registry so registrations never leak between
//! tests running in parallel.

use std::collections::BTreeMap;

use rstest::{fixture, rstest};
use superserial::{
    AutoSerializable, Color, DecodeError, Error, Point, Serializable, Serialized, TypeDescriptor,
    TypeRegistry, Value,
};

const BOB: &str = r#"{"ss_case":"type","ss_value":{"ss_typeName":"Person","ss_data":{"ss_case":"dict","ss_value":{"age":{"ss_case":"int","ss_value":20},"name":{"ss_case":"string","ss_value":"Bob"}}}}}"#;

#[derive(Debug, Clone, PartialEq, AutoSerializable)]
struct Person {
    name: String,
    age: i64,
}

#[derive(Debug, Clone, PartialEq, AutoSerializable)]
struct Team {
    name: String,
    lead: Person,
    members: Vec<Person>,
    home: Point,
    colors: BTreeMap<String, Color>,
}

#[derive(Debug, Clone, PartialEq, AutoSerializable)]
#[superserial(type_name = "app.Profile")]
struct Profile {
    #[superserial(rename = "displayName")]
    display_name: String,
    nickname: Option<String>,
    score: Option<f64>,
    #[superserial(skip)]
    scratch: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, AutoSerializable)]
struct Token {
    r#type: String,
    value: i64,
}

fn bob() -> Person {
    Person {
        name: "Bob".into(),
        age: 20,
    }
}

#[fixture]
fn registry() -> TypeRegistry {
    TypeRegistry::with_types([
        TypeDescriptor::of::<Person>(),
        TypeDescriptor::of::<Team>(),
        TypeDescriptor::of::<Profile>(),
    ])
}

#[test]
fn test_person_encodes_to_exact_envelope() {
    assert_eq!(superserial::to_string(&bob()).unwrap(), BOB);
}

#[rstest]
fn test_person_decodes_from_exact_envelope(registry: TypeRegistry) {
    let person: Person = superserial::from_str_with(BOB, &registry).unwrap();
    assert_eq!(person, bob());

    let value = superserial::from_str_value_with(BOB, &registry).unwrap();
    assert_eq!(value.downcast_ref::<Person>(), Some(&bob()));
}

#[test]
fn test_unknown_type_fails_without_panicking() {
    let registry = TypeRegistry::new();
    let err = superserial::from_str_value_with(BOB, &registry).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(DecodeError::UnknownType(ref name)) if name == "Person"
    ));
}

#[rstest]
fn test_registry_replacement(registry: TypeRegistry) {
    assert!(superserial::from_str_value_with(BOB, &registry).is_ok());

    registry.register([TypeDescriptor::of::<Team>()]);
    assert!(superserial::from_str_value_with(BOB, &registry).is_err());
    assert!(registry.contains("Team"));
}

#[rstest]
fn test_nested_aggregates_round_trip(registry: TypeRegistry) {
    let team = Team {
        name: "core".into(),
        lead: bob(),
        members: vec![
            bob(),
            Person {
                name: "Zoë".into(),
                age: 31,
            },
        ],
        home: Point::new(1.5, -2.0),
        colors: BTreeMap::from([("primary".to_string(), Color::rgb(0x10, 0x20, 0x30))]),
    };

    let text = superserial::to_string(&team).unwrap();
    assert!(text.is_ascii());

    let decoded: Team = superserial::from_str_with(&text, &registry).unwrap();
    assert_eq!(decoded, team);
}

#[test]
fn test_nested_unregistered_type_fails_whole_aggregate() {
    let registry = TypeRegistry::with_types([TypeDescriptor::of::<Team>()]);
    let team = Team {
        name: "core".into(),
        lead: bob(),
        members: vec![],
        home: Point::default(),
        colors: BTreeMap::new(),
    };

    let text = superserial::to_string(&team).unwrap();
    let err = superserial::from_str_with::<Team>(&text, &registry).unwrap_err();
    let Error::Decode(err) = err else {
        panic!("expected a decode error, got {err:?}");
    };
    assert!(matches!(err, DecodeError::InField { ref field, .. } if field == "lead"));
    assert_eq!(err.root_cause(), &DecodeError::UnknownType("Person".into()));
}

#[rstest]
fn test_attributes_shape_the_payload(registry: TypeRegistry) {
    let profile = Profile {
        display_name: "Bobby".into(),
        nickname: None,
        score: Some(9.5),
        scratch: vec![1, 2, 3],
    };

    let encoded = profile.serialize();
    assert_eq!(encoded.type_name(), Some("app.Profile"));
    let Serialized::CustomType { data, .. } = &encoded else {
        panic!("expected a custom type");
    };
    let Serialized::Dict(fields) = data.as_ref() else {
        panic!("expected a dict payload");
    };
    assert_eq!(
        fields.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["displayName", "score"]
    );

    let decoded: Profile = superserial::decode_as(&encoded, &registry).unwrap();
    assert_eq!(
        decoded,
        Profile {
            scratch: Vec::new(),
            ..profile
        }
    );
}

#[test]
fn test_raw_identifier_fields_use_plain_keys() {
    let token = Token {
        r#type: "kw".into(),
        value: 3,
    };

    let text = superserial::to_string(&token).unwrap();
    assert_eq!(
        text,
        r#"{"ss_case":"type","ss_value":{"ss_typeName":"Token","ss_data":{"ss_case":"dict","ss_value":{"type":{"ss_case":"string","ss_value":"kw"},"value":{"ss_case":"int","ss_value":3}}}}}"#
    );
    assert!(!text.contains("r#type"));

    let registry = TypeRegistry::with_types([TypeDescriptor::of::<Token>()]);
    let decoded: Token = superserial::from_str_with(&text, &registry).unwrap();
    assert_eq!(decoded, token);
}

#[rstest]
fn test_missing_required_field_is_reported(registry: TypeRegistry) {
    let text = r#"{"ss_case":"type","ss_value":{"ss_typeName":"Person","ss_data":{"ss_case":"dict","ss_value":{"name":{"ss_case":"string","ss_value":"Bob"}}}}}"#;

    let err = superserial::from_str_value_with(text, &registry).unwrap_err();
    assert!(matches!(
        err,
        Error::Decode(DecodeError::MissingField(ref field)) if field == "age"
    ));
}

#[rstest]
fn test_mistyped_field_is_reported(registry: TypeRegistry) {
    let text = BOB.replace(
        r#"{"ss_case":"int","ss_value":20}"#,
        r#"{"ss_case":"string","ss_value":"20"}"#,
    );

    let err = superserial::from_str_with::<Person>(&text, &registry).unwrap_err();
    let Error::Decode(err) = err else {
        panic!("expected a decode error, got {err:?}");
    };
    assert_eq!(
        err,
        DecodeError::InField {
            field: "age".into(),
            source: Box::new(DecodeError::Mismatch {
                expected: "integer",
                found: "string"
            }),
        }
    );
}

#[rstest]
fn test_legacy_struct_tag_decodes(registry: TypeRegistry) {
    let text = BOB.replacen(r#""ss_case":"type""#, r#""ss_case":"struct""#, 1);
    let person: Person = superserial::from_str_with(&text, &registry).unwrap();
    assert_eq!(person, bob());

    // Rendering always writes the canonical tag.
    assert_eq!(superserial::to_string(&person).unwrap(), BOB);
}

#[rstest]
fn test_bare_payload_decodes_through_field_constructor(registry: TypeRegistry) {
    let text = r#"{"ss_case":"dict","ss_value":{"age":{"ss_case":"int","ss_value":20},"name":{"ss_case":"string","ss_value":"Bob"}}}"#;
    let person: Person = superserial::from_str_with(text, &registry).unwrap();
    assert_eq!(person, bob());
}

#[rstest]
fn test_array_of_aggregates_decodes_generically(registry: TypeRegistry) {
    let people = vec![bob(), bob()];
    let text = superserial::to_string(&people).unwrap();

    let value = superserial::from_str_value_with(&text, &registry).unwrap();
    let Value::Array(items) = value else {
        panic!("expected an array");
    };
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|item| item.downcast_ref::<Person>() == Some(&bob())));
}

#[rstest]
fn test_pretty_output_decodes_to_same_value(registry: TypeRegistry) {
    let text = superserial::to_string_with(&bob(), &superserial::RenderOptions::pretty()).unwrap();
    assert!(text.contains('\n'));

    let person: Person = superserial::from_slice_with(text.as_bytes(), &registry).unwrap();
    assert_eq!(person, bob());
}
