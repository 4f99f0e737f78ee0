use docjson::binary::type_marker::*;
use docjson::{JsonError, JsonReader, JsonWriter, Number64, TokenType};
use proptest::prelude::*;

fn writers() -> [JsonWriter; 2] {
    [JsonWriter::text(), JsonWriter::binary()]
}

fn read_single(bytes: &[u8]) -> JsonReader<'_> {
    let mut reader = JsonReader::new(bytes).unwrap_or_else(|e| panic!("reader: {e}"));
    assert!(reader.read().unwrap_or_else(|e| panic!("read: {e}")));
    reader
}

fn number_roundtrip(value: Number64) -> Vec<Number64> {
    writers()
        .into_iter()
        .map(|mut writer| {
            writer.write_number64_value(value).unwrap();
            let bytes = writer.get_result().unwrap();
            read_single(&bytes).get_number_value().unwrap()
        })
        .collect()
}

#[test]
fn generic_integer_boundaries_matrix() {
    let cases = [
        0,
        1,
        31,
        32,
        255,
        256,
        -1,
        i64::from(i16::MIN),
        i64::from(i16::MAX),
        i64::from(i16::MIN) - 1,
        i64::from(i16::MAX) + 1,
        i64::from(i32::MIN),
        i64::from(i32::MAX),
        i64::from(i32::MIN) - 1,
        i64::from(i32::MAX) + 1,
        i64::MIN,
        i64::MAX,
    ];
    for value in cases {
        for back in number_roundtrip(Number64::Integer(value)) {
            assert_eq!(back.as_exact_i64(), Some(value), "{value}");
        }
    }
}

#[test]
fn generic_double_boundaries_matrix() {
    let cases = [
        0.5,
        -0.5,
        f64::MAX,
        f64::MIN,
        f64::MIN_POSITIVE,
        f64::EPSILON,
        5e-324,
        1e15,
        -1e-7,
        std::f64::consts::PI,
    ];
    for value in cases {
        for back in number_roundtrip(Number64::Double(value)) {
            assert_eq!(back.to_f64().to_bits(), value.to_bits(), "{value:e}");
        }
    }
}

#[test]
fn non_finite_doubles_survive_both_formats() {
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let backs = number_roundtrip(Number64::Double(value));
        for back in backs {
            if value.is_nan() {
                assert!(back.is_nan());
            } else {
                assert_eq!(back.to_f64(), value);
            }
        }
    }

    let mut text = JsonWriter::text();
    text.write_number64_value(Number64::Double(f64::NEG_INFINITY)).unwrap();
    assert_eq!(text.get_result().unwrap(), b"\"-Infinity\"");
}

#[test]
fn smallest_integer_encoding_matrix() {
    let cases: [(i64, u8, usize); 10] = [
        (0, 0x00, 1),
        (4, 0x04, 1),
        (31, 0x1F, 1),
        (32, NUMBER_UINT8, 2),
        (255, NUMBER_UINT8, 2),
        (256, NUMBER_INT16, 3),
        (-1, NUMBER_INT16, 3),
        (-32769, NUMBER_INT32, 5),
        (2_147_483_648, NUMBER_INT64, 9),
        (i64::MIN, NUMBER_INT64, 9),
    ];
    for (value, marker, length) in cases {
        let mut writer = JsonWriter::binary();
        writer.write_number64_value(Number64::Integer(value)).unwrap();
        let bytes = writer.get_result().unwrap();
        assert_eq!(bytes[1], marker, "{value}");
        assert_eq!(bytes.len(), 1 + length, "{value}");
    }
}

#[test]
fn sized_types_keep_their_width() {
    for mut writer in writers() {
        writer.write_array_start().unwrap();
        writer.write_int8_value(i8::MIN).unwrap();
        writer.write_int8_value(i8::MAX).unwrap();
        writer.write_int16_value(i16::MIN).unwrap();
        writer.write_int16_value(i16::MAX).unwrap();
        writer.write_int32_value(i32::MIN).unwrap();
        writer.write_int32_value(i32::MAX).unwrap();
        writer.write_int64_value(i64::MIN).unwrap();
        writer.write_int64_value(i64::MAX).unwrap();
        writer.write_uint32_value(u32::MIN).unwrap();
        writer.write_uint32_value(u32::MAX).unwrap();
        writer.write_float32_value(f32::MIN).unwrap();
        writer.write_float32_value(f32::MAX).unwrap();
        writer.write_float32_value(f32::MIN_POSITIVE).unwrap();
        writer.write_float64_value(f64::MIN).unwrap();
        writer.write_float64_value(f64::MAX).unwrap();
        writer.write_float64_value(f64::MIN_POSITIVE).unwrap();
        writer.write_array_end().unwrap();
        let bytes = writer.get_result().unwrap();
        let format = writer.serialization_format();

        let mut reader = JsonReader::new(&bytes).unwrap();
        let mut seen = Vec::new();
        while reader.read().unwrap_or_else(|e| panic!("{format:?}: {e}")) {
            let token = reader.current_token_type();
            let value = match token {
                TokenType::Int8 => reader.get_int8_value().unwrap().to_string(),
                TokenType::Int16 => reader.get_int16_value().unwrap().to_string(),
                TokenType::Int32 => reader.get_int32_value().unwrap().to_string(),
                TokenType::Int64 => reader.get_int64_value().unwrap().to_string(),
                TokenType::UInt32 => reader.get_uint32_value().unwrap().to_string(),
                TokenType::Float32 => format!("{:?}", reader.get_float32_value().unwrap()),
                TokenType::Float64 => format!("{:?}", reader.get_float64_value().unwrap()),
                _ => String::new(),
            };
            seen.push((token, value));
        }

        let expected = vec![
            (TokenType::BeginArray, String::new()),
            (TokenType::Int8, i8::MIN.to_string()),
            (TokenType::Int8, i8::MAX.to_string()),
            (TokenType::Int16, i16::MIN.to_string()),
            (TokenType::Int16, i16::MAX.to_string()),
            (TokenType::Int32, i32::MIN.to_string()),
            (TokenType::Int32, i32::MAX.to_string()),
            (TokenType::Int64, i64::MIN.to_string()),
            (TokenType::Int64, i64::MAX.to_string()),
            (TokenType::UInt32, u32::MIN.to_string()),
            (TokenType::UInt32, u32::MAX.to_string()),
            (TokenType::Float32, format!("{:?}", f32::MIN)),
            (TokenType::Float32, format!("{:?}", f32::MAX)),
            (TokenType::Float32, format!("{:?}", f32::MIN_POSITIVE)),
            (TokenType::Float64, format!("{:?}", f64::MIN)),
            (TokenType::Float64, format!("{:?}", f64::MAX)),
            (TokenType::Float64, format!("{:?}", f64::MIN_POSITIVE)),
            (TokenType::EndArray, String::new()),
        ];
        assert_eq!(seen, expected, "{format:?}");
    }
}

#[test]
fn sigil_literals_out_of_range_are_rejected() {
    let cases = [
        ("I128", "128"),
        ("I-129", "-129"),
        ("H32768", "32768"),
        ("L2147483648", "2147483648"),
        ("UL-1", "-1"),
        ("UL4294967296", "4294967296"),
        ("S1e39", "1e39"),
    ];
    for (text, literal) in cases {
        let mut reader = JsonReader::new(text.as_bytes()).unwrap();
        assert_eq!(
            reader.read(),
            Err(JsonError::NumberOutOfRange(literal.to_owned())),
            "{text}"
        );
    }
}

#[test]
fn huge_integer_literal_loses_precision_consistently() {
    let huge = format!("1{}", "0".repeat(199));
    let reader = read_single(huge.as_bytes());
    let from_text = reader.get_number_value().unwrap();
    assert_eq!(from_text.to_f64(), huge.parse::<f64>().unwrap());

    let mut writer = JsonWriter::binary();
    writer.write_number64_value(from_text).unwrap();
    let bytes = writer.get_result().unwrap();
    let from_binary = read_single(&bytes).get_number_value().unwrap();
    assert_eq!(from_binary.to_f64().to_bits(), from_text.to_f64().to_bits());
}

proptest! {
    #[test]
    fn any_integer_roundtrips(value in any::<i64>()) {
        for back in number_roundtrip(Number64::Integer(value)) {
            prop_assert_eq!(back.as_exact_i64(), Some(value));
        }
    }

    #[test]
    fn any_finite_double_roundtrips(value in any::<f64>().prop_filter("finite", |v| v.is_finite())) {
        for back in number_roundtrip(Number64::Double(value)) {
            prop_assert_eq!(back.to_f64(), value);
        }
    }
}
