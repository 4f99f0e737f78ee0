use docjson::binary::type_marker::*;
use docjson::{JsonNavigator, JsonReader, JsonWriter, TokenType, WriterOptions};
use proptest::prelude::*;

fn encode_string(value: &str, options: WriterOptions) -> Vec<u8> {
    let mut writer = JsonWriter::binary_with_options(options);
    writer
        .write_string_value(value)
        .unwrap_or_else(|e| panic!("write {value:?}: {e}"));
    writer.get_result().unwrap()
}

fn decode_string(bytes: &[u8]) -> String {
    let mut reader = JsonReader::new(bytes).unwrap_or_else(|e| panic!("reader: {e}"));
    assert!(reader.read().unwrap());
    assert_eq!(reader.current_token_type(), TokenType::String);
    reader
        .get_string_value()
        .unwrap_or_else(|e| panic!("decode {bytes:02x?}: {e}"))
        .into_owned()
}

fn sentence(times: usize) -> String {
    "The quick brown fox jumps over the lazy dog! ".repeat(times)
}

#[test]
fn compressed_marker_matrix() {
    let cases: Vec<(String, u8)> = vec![
        ("123e4567-e89b-12d3-a456-426614174000".into(), LOWERCASE_GUID_STRING),
        ("00000000-0000-0000-0000-000000000000".into(), LOWERCASE_GUID_STRING),
        ("123E4567-E89B-12D3-A456-426614174000".into(), UPPERCASE_GUID_STRING),
        (
            "\"123e4567-e89b-12d3-a456-426614174000\"".into(),
            DOUBLE_QUOTED_LOWERCASE_GUID_STRING,
        ),
        ("2024-01-15T10:30:00.000Z".into(), COMPRESSED_DATE_TIME_STRING),
        ("2024-01-15 10:30:00".into(), COMPRESSED_DATE_TIME_STRING),
        ("1234567890123456".into(), COMPRESSED_DATE_TIME_STRING),
        ("0123456789abcdef0123".into(), COMPRESSED_LOWERCASE_HEX_STRING),
        ("DEADBEEFDEADBEEF".into(), COMPRESSED_UPPERCASE_HEX_STRING),
        ("abcdefghijklmnopabcdefghijklmnop".into(), PACKED_4_BIT_STRING),
        ("the_quick_brown_fox_jumps_over_the_lazy_dog_".into(), PACKED_5_BIT_STRING),
        ("The_quick_brown_fox_jumps_over_the_lazy_dog_".into(), PACKED_6_BIT_STRING),
        (sentence(2), PACKED_7_BIT_STRING_LENGTH_1),
        (sentence(10), PACKED_7_BIT_STRING_LENGTH_2),
    ];
    for (value, marker) in cases {
        let bytes = encode_string(&value, WriterOptions::default());
        assert_eq!(bytes[1], marker, "{value:?}");
        assert!(bytes.len() < value.len() + 2, "{value:?} did not shrink");
        assert_eq!(decode_string(&bytes), value);
    }
}

#[test]
fn ineligible_strings_stay_literal() {
    let cases = [
        "short",
        "0123456789abcde",
        "héllo wörld, this is not ascii",
        "123e4567-E89B-12d3-a456-426614174000",
        "123e4567-e89b-12d3-a456-42661417400g",
        "\"123E4567-E89B-12D3-A456-426614174000\"",
    ];
    for value in cases {
        let bytes = encode_string(value, WriterOptions::default());
        assert_ne!(bytes[1], LOWERCASE_GUID_STRING, "{value:?}");
        assert_ne!(bytes[1], UPPERCASE_GUID_STRING, "{value:?}");
        assert_ne!(bytes[1], DOUBLE_QUOTED_LOWERCASE_GUID_STRING, "{value:?}");
        assert_eq!(decode_string(&bytes), value);
    }
    assert_eq!(encode_string("short", WriterOptions::default())[1], ENCODED_LENGTH_STRING_MIN + 5);
}

#[test]
fn encoded_strings_can_be_disabled() {
    let options = WriterOptions::new().with_encoded_strings(false);
    for value in ["2024-01-15T10:30:00.000Z", "123e4567-e89b-12d3-a456-426614174000"] {
        let bytes = encode_string(value, options.clone());
        assert_eq!(bytes[1], ENCODED_LENGTH_STRING_MIN + value.len() as u8);
        assert_eq!(&bytes[2..], value.as_bytes());
    }
}

#[test]
fn buffered_access_only_for_literal_strings() {
    let mut writer = JsonWriter::binary();
    writer.write_array_start().unwrap();
    writer.write_string_value("literal text").unwrap();
    writer.write_string_value("2024-01-15T10:30:00.000Z").unwrap();
    writer.write_array_end().unwrap();
    let bytes = writer.get_result().unwrap();

    let navigator = JsonNavigator::new(&bytes).unwrap();
    let root = navigator.get_root_node();
    let literal = navigator.get_array_item_at(root, 0).unwrap();
    let compressed = navigator.get_array_item_at(root, 1).unwrap();
    assert_eq!(navigator.try_get_buffered_string(literal), Some("literal text"));
    assert_eq!(navigator.try_get_buffered_string(compressed), None);
    assert_eq!(navigator.get_string_value(compressed).unwrap(), "2024-01-15T10:30:00.000Z");
}

proptest! {
    #[test]
    fn date_time_strings_roundtrip(value in "[ .:TZ0-9-]{16,80}") {
        let bytes = encode_string(&value, WriterOptions::default());
        prop_assert!(bytes.len() < value.len() + 2);
        prop_assert_eq!(decode_string(&bytes), value);
    }

    #[test]
    fn hex_strings_keep_case(value in "[0-9a-f]{16,80}|[0-9A-F]{16,80}") {
        let bytes = encode_string(&value, WriterOptions::default());
        prop_assert_eq!(decode_string(&bytes), value);
    }

    #[test]
    fn guid_strings_keep_case(bytes in any::<[u8; 16]>(), upper in any::<bool>()) {
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let mut guid = format!("{}-{}-{}-{}-{}", &hex[..8], &hex[8..12], &hex[12..16], &hex[16..20], &hex[20..]);
        if upper {
            guid = guid.to_uppercase();
        }
        let encoded = encode_string(&guid, WriterOptions::default());
        prop_assert_eq!(encoded.len(), 1 + 17);
        prop_assert_eq!(decode_string(&encoded), guid);
    }

    #[test]
    fn printable_ascii_roundtrips(value in "[ -~]{0,300}") {
        let bytes = encode_string(&value, WriterOptions::default());
        prop_assert_eq!(decode_string(&bytes), value);
    }
}
