use variant::{
    encode,
    encode_json,
    materialize,
    parse_json,
    to_json,
    MetadataReader,
    ValueReader,
    VariantValue,
};

fn decode(metadata: &[u8], value: &[u8]) -> VariantValue {
    let metadata = MetadataReader::new(metadata).unwrap();
    let reader = ValueReader::new(metadata, value).unwrap();
    materialize(&reader).unwrap()
}

fn json_text(metadata: &[u8], value: &[u8]) -> String {
    let metadata = MetadataReader::new(metadata).unwrap();
    let reader = ValueReader::new(metadata, value).unwrap();
    String::from_utf8(to_json(&reader).unwrap()).unwrap()
}

#[test]
fn test_scalar_json_round_trips_textually() {
    let cases = [
        "null",
        "true",
        "false",
        "0",
        "42",
        "-128",
        "300",
        "-70000",
        "9007199254740993",
        "1.5",
        "-0.25",
        "1e30",
        "\"hi\"",
        "\"\"",
        "{}",
        "[]",
    ];
    for case in cases {
        let (metadata, value) = encode_json(case.as_bytes()).unwrap();
        assert_eq!(json_text(&metadata, &value), case, "case `{}`", case);
    }
}

#[test]
fn test_encode_json_agrees_with_tree_encoding() {
    let documents = [
        &br#"{"age":30,"name":"Bob"}"#[..],
        br#"[1,"two",null,{"x":[true,false]}]"#,
        br#"{"nested":{"deep":{"deeper":[1,2,3]}}}"#,
    ];
    for document in documents {
        let (json_metadata, json_value) = encode_json(document).unwrap();
        let tree = parse_json(document).unwrap();
        let (tree_metadata, tree_value) = encode(&tree).unwrap();
        // Same content must produce identical blobs on either path.
        assert_eq!(json_metadata, tree_metadata);
        assert_eq!(json_value, tree_value);
    }
}

#[test]
fn test_structural_round_trip_of_nested_document() {
    let document = br#"{"users":[{"name":"Alice","scores":[95,87]},{"name":"Bob"}]}"#;
    let first_parse = parse_json(document).unwrap();

    let (metadata, value) = encode_json(document).unwrap();
    let decoded = decode(&metadata, &value);
    assert_eq!(decoded, first_parse);

    let re_emitted = json_text(&metadata, &value);
    let second_parse = parse_json(re_emitted.as_bytes()).unwrap();
    assert_eq!(second_parse, first_parse);
}

#[test]
fn test_key_order_does_not_affect_equality() {
    let forward = parse_json(br#"{"a":1,"b":2}"#).unwrap();
    let backward = parse_json(br#"{"b":2,"a":1}"#).unwrap();
    assert_eq!(forward, backward);
}

#[test]
fn test_emitted_objects_are_in_dictionary_order() {
    let (metadata, value) = encode_json(br#"{"zebra":1,"apple":2,"mango":3}"#).unwrap();
    assert_eq!(
        json_text(&metadata, &value),
        r#"{"apple":2,"mango":3,"zebra":1}"#,
    );
}

#[test]
fn test_string_escape_round_trip() {
    let document = r#""line\nbreak \"quoted\" back\\slash""#;
    let (metadata, value) = encode_json(document.as_bytes()).unwrap();
    assert_eq!(
        decode(&metadata, &value),
        VariantValue::from("line\nbreak \"quoted\" back\\slash"),
    );
    assert_eq!(json_text(&metadata, &value), document);
}

#[test]
fn test_unicode_passes_through() {
    let document = "\"caf\u{e9} \u{1F600}\"";
    let (metadata, value) = encode_json(document.as_bytes()).unwrap();
    assert_eq!(json_text(&metadata, &value), document);
}

#[test]
fn test_repeated_keys_share_one_dictionary_entry() {
    let (metadata, _) = encode_json(
        br#"[{"id":1,"v":2},{"id":3,"v":4},{"id":5,"v":6}]"#,
    ).unwrap();
    let reader = MetadataReader::new(&metadata).unwrap();
    assert_eq!(reader.size(), 2);
    assert_eq!(reader.find(b"id"), Some(0));
    assert_eq!(reader.find(b"v"), Some(1));
}

#[test]
fn test_shared_metadata_across_values() {
    // One dictionary, many rows: the typical columnar arrangement.
    let rows = [
        &br#"{"id":1,"name":"a"}"#[..],
        br#"{"id":2,"name":"b"}"#,
    ];
    for row in rows {
        let (metadata, value) = encode_json(row).unwrap();
        let decoded = decode(&metadata, &value);
        assert_eq!(decoded, parse_json(row).unwrap());
    }
}
