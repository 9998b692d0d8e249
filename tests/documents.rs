use internet_object::{
    parse, parse_document, tokenize, ParseOptions, TokenSubType, TokenType, Value,
};
use rstest::rstest;
use serde_json::json;

#[rstest]
fn key_value_scenario() {
    let tokens = tokenize("a: 1, b: 2").unwrap();
    assert_eq!(tokens[2].token_type, TokenType::Number);

    let value: serde_json::Value = parse("a: 1, b: 2").unwrap().into();
    assert_eq!(value, json!({"a": 1, "b": 2}));
}

#[rstest]
fn tilde_header_scenario() {
    let tokens = tokenize("~ 1, 2, 3").unwrap();
    assert_eq!(tokens[0].token_type, TokenType::Tilde);
    let numbers: Vec<&Value> = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Number)
        .map(|t| &t.value)
        .collect();
    assert_eq!(
        numbers,
        vec![&Value::Int(1), &Value::Int(2), &Value::Int(3)]
    );
}

#[rstest]
fn raw_string_scenario() {
    let tokens = tokenize("r\"a\\nb\"").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].sub_type, Some(TokenSubType::RawString));
    assert_eq!(tokens[0].value, Value::String("a\\nb".to_string()));
}

#[rstest]
fn unicode_escape_scenario() {
    let tokens = tokenize("\"a\\u00e9\"").unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].value, Value::String("a\u{e9}".to_string()));
}

#[rstest]
fn positional_gap_scenario() {
    let value: serde_json::Value = parse("[1, , 3]").unwrap().into();
    assert_eq!(value, json!([1, "", 3]));
}

#[rstest]
fn comment_and_section_scenario() {
    let tokens = tokenize("# hi\n---\n1").unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].token_type, TokenType::SectionSep);
    assert_eq!(tokens[1].token_type, TokenType::Number);
    assert_eq!(tokens[1].value, Value::Int(1));
}

#[rstest]
fn sections_produce_one_value_each() {
    let doc = parse_document(
        "name: config\n---\n1, 2, 3\n---\ndone",
        &ParseOptions::default(),
    )
    .unwrap();
    assert_eq!(doc.len(), 3);
    assert_eq!(
        serde_json::Value::from(doc.sections()[0].clone()),
        json!({"name": "config"})
    );
    assert_eq!(doc.sections()[2], Value::String("done".to_string()));
}

#[rstest]
fn document_round_trip_through_json() {
    let input = "server: {host: localhost, port: 8080, tls: T},\nretries: 3,\ntags: [a, b, c]";
    let value: serde_json::Value = parse(input).unwrap().into();
    assert_eq!(
        value,
        json!({
            "server": {"host": "localhost", "port": 8080, "tls": true},
            "retries": 3,
            "tags": ["a", "b", "c"]
        })
    );
}

#[rstest]
fn bytes_and_big_numbers_survive_the_pipeline() {
    let value = parse("blob: b\"aGVsbG8=\", big: 18446744073709551615").unwrap();
    assert_eq!(value.get("blob"), Some(&Value::Bytes(b"hello".to_vec())));
    assert!(matches!(value.get("big"), Some(Value::BigInt(_))));
}
