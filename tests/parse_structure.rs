use internet_object::{parse, parse_with_options, ErrorCode, ParseOptions, Value};
use rstest::rstest;
use serde_json::json;

fn parse_json(input: &str) -> serde_json::Value {
    parse(input).unwrap().into()
}

#[rstest]
fn objects_arrays_and_pairs_nest() {
    assert_eq!(
        parse_json("user: {name: Ada, tags: [math, code]}, active: T"),
        json!({"user": {"name": "Ada", "tags": ["math", "code"]}, "active": true})
    );
}

#[rstest]
fn single_value_documents_unwrap() {
    assert_eq!(parse_json("42"), json!(42));
    assert_eq!(parse_json("[1, 2]"), json!([1, 2]));
    assert_eq!(parse_json("{a: 1}"), json!({"a": 1}));
    assert_eq!(parse("").unwrap(), Value::Null);
}

#[rstest]
fn positional_gap_semantics() {
    assert_eq!(parse_json("[1, , 3]"), json!([1, "", 3]));
    assert_eq!(parse_json("[, ]"), json!([]));
    assert_eq!(parse_json("[a, , , b]"), json!(["a", "", "", "b"]));
}

#[rstest]
fn colon_binds_the_previous_primitive() {
    assert_eq!(parse_json("x: 1"), json!({"x": 1}));
    assert_eq!(parse_json("2: two"), json!({"2": "two"}));
    assert_eq!(parse_json("T: yes"), json!({"true": "yes"}));
}

#[rstest]
fn every_open_bracket_needs_its_close() {
    for input in ["[", "{", "[{}", "{a: [1, 2}"] {
        let err = parse(input).unwrap_err();
        assert!(
            matches!(err.code, ErrorCode::OpenBracket | ErrorCode::InvalidBracket),
            "for {input:?}: {err}"
        );
    }
}

#[rstest]
fn mismatched_brackets_carry_the_offending_position() {
    let err = parse("[1, 2}").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidBracket);
    let position = err.position.expect("bracket errors carry positions");
    assert_eq!(position.col, 6);
}

#[rstest]
fn ill_formed_keys_are_rejected() {
    for input in [": 1", "[1]: 2", "{}: 3", "N: 4"] {
        let err = parse(input).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidValue, "for {input:?}");
    }
}

#[rstest]
fn deep_nesting_is_bounded() {
    let options = ParseOptions::new().with_max_depth(16);
    let deep = "[".repeat(32);
    let err = parse_with_options(&deep, &options).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidArray);

    let shallow = format!("{}{}", "[".repeat(8), "]".repeat(8));
    assert!(parse_with_options(&shallow, &options).is_ok());
}

#[rstest]
fn document_shape_matches_grammar() {
    // Mixed named and positional members stay in one structure.
    assert_eq!(
        parse_json("Ada, age: 36, [1, 2]"),
        json!({"0": "Ada", "age": 36, "2": [1, 2]})
    );
}
