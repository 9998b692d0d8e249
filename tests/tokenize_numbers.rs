use internet_object::{tokenize, ErrorCode, TokenSubType, TokenType, Value};
use num_bigint::BigInt;
use rstest::rstest;

#[rstest]
#[case("0", Value::Int(0))]
#[case("42", Value::Int(42))]
#[case("-5", Value::Int(-5))]
#[case("+12", Value::Int(12))]
#[case("3.5", Value::Float(3.5))]
#[case("-0.25", Value::Float(-0.25))]
#[case("1e3", Value::Float(1000.0))]
#[case("2E-2", Value::Float(0.02))]
#[case("1.5e2", Value::Float(150.0))]
fn decimal_forms(#[case] input: &str, #[case] expected: Value) {
    let tokens = tokenize(input).unwrap();
    assert_eq!(tokens.len(), 1, "for {input:?}");
    assert_eq!(tokens[0].token_type, TokenType::Number);
    assert_eq!(tokens[0].value, expected);
}

#[rstest]
#[case("0xff", 255, TokenSubType::Hex)]
#[case("0XFF", 255, TokenSubType::Hex)]
#[case("0c17", 15, TokenSubType::Octal)]
#[case("0b1010", 10, TokenSubType::Binary)]
#[case("-0x10", -16, TokenSubType::Hex)]
fn radix_forms(#[case] input: &str, #[case] expected: i64, #[case] sub: TokenSubType) {
    let tokens = tokenize(input).unwrap();
    assert_eq!(tokens[0].value, Value::Int(expected));
    assert_eq!(tokens[0].sub_type, Some(sub));
}

#[rstest]
fn radix_numbers_are_integers_not_floats() {
    for input in ["0x10", "0c7", "0b1"] {
        let tokens = tokenize(input).unwrap();
        assert!(matches!(tokens[0].value, Value::Int(_)), "for {input:?}");
    }
}

#[rstest]
fn oversized_literals_become_big_integers() {
    let tokens = tokenize("340282366920938463463374607431768211456").unwrap();
    let expected = "340282366920938463463374607431768211456"
        .parse::<BigInt>()
        .unwrap();
    assert_eq!(tokens[0].value, Value::BigInt(expected));

    let tokens = tokenize("0xffffffffffffffffff").unwrap();
    let expected = BigInt::parse_bytes(b"ffffffffffffffffff", 16).unwrap();
    assert_eq!(tokens[0].value, Value::BigInt(expected));
}

#[rstest]
fn bare_sign_starts_an_open_string() {
    let tokens = tokenize("-").unwrap();
    assert_eq!(tokens[0].value, Value::String("-".to_string()));

    let tokens = tokenize("-not-a-number").unwrap();
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].value, Value::String("-not-a-number".to_string()));

    let tokens = tokenize("+later").unwrap();
    assert_eq!(tokens[0].value, Value::String("+later".to_string()));
}

#[rstest]
#[case("12px")]
#[case("1.2.3")]
#[case("0xg")]
#[case("1e")]
#[case("3.")]
fn malformed_numbers_fall_back_to_open_strings(#[case] input: &str) {
    let tokens = tokenize(input).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].sub_type, Some(TokenSubType::OpenString));
    assert_eq!(tokens[0].value, Value::String(input.to_string()));
}

#[rstest]
fn numbers_terminate_at_structural_chars() {
    let tokens = tokenize("[1,2]").unwrap();
    let kinds: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(
        kinds,
        vec![
            TokenType::BracketOpen,
            TokenType::Number,
            TokenType::Comma,
            TokenType::Number,
            TokenType::BracketClose,
        ]
    );
}

#[rstest]
fn section_separator_wins_over_numbers() {
    let tokens = tokenize("--- 5").unwrap();
    assert_eq!(tokens[0].token_type, TokenType::SectionSep);
    assert_eq!(tokens[1].value, Value::Int(5));
}

#[rstest]
fn unexpected_character_reports_position() {
    // A quote mid-open-string region terminates the open string; the dangling
    // quote itself is an unterminated string.
    let err = tokenize("abc \"").unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidChar);
    let position = err.position.expect("lexical errors carry positions");
    assert_eq!(position.row, 1);
    assert_eq!(position.col, 5);
}
