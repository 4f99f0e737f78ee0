//! Binary type marker table.
//!
//! Every binary value starts with one marker byte that fixes both the value
//! kind and its exact layout. Multi-byte payloads are little-endian.

/// First byte of every binary buffer.
pub const BINARY_FORMAT: u8 = 0x80;

// Immediate integers 0..=31 (no payload)
pub const LITERAL_INT_MIN: u8 = 0x00;
pub const LITERAL_INT_MAX: u8 = 0x20;

// Dictionary-coded strings
pub const SYSTEM_STRING_MIN: u8 = 0x20;
pub const SYSTEM_STRING_MAX: u8 = 0x40;
pub const USER_STRING_1_BYTE_MIN: u8 = 0x40;
pub const USER_STRING_1_BYTE_MAX: u8 = 0x60;
pub const USER_STRING_2_BYTE_MIN: u8 = 0x60;
pub const USER_STRING_2_BYTE_MAX: u8 = 0x68;

// Pattern-compressed strings
pub const LOWERCASE_GUID_STRING: u8 = 0x75;
pub const UPPERCASE_GUID_STRING: u8 = 0x76;
pub const DOUBLE_QUOTED_LOWERCASE_GUID_STRING: u8 = 0x77;
pub const COMPRESSED_LOWERCASE_HEX_STRING: u8 = 0x78;
pub const COMPRESSED_UPPERCASE_HEX_STRING: u8 = 0x79;
pub const COMPRESSED_DATE_TIME_STRING: u8 = 0x7A;
pub const PACKED_4_BIT_STRING: u8 = 0x7B;
pub const PACKED_5_BIT_STRING: u8 = 0x7C;
pub const PACKED_6_BIT_STRING: u8 = 0x7D;
pub const PACKED_7_BIT_STRING_LENGTH_1: u8 = 0x7E;
pub const PACKED_7_BIT_STRING_LENGTH_2: u8 = 0x7F;

// Strings whose length is encoded in the marker (0..=63 bytes)
pub const ENCODED_LENGTH_STRING_MIN: u8 = 0x80;
pub const ENCODED_LENGTH_STRING_MAX: u8 = 0xC0;

// Length-prefixed and reference strings
pub const STR_L1: u8 = 0xC0;
pub const STR_L2: u8 = 0xC1;
pub const STR_L4: u8 = 0xC2;
pub const STR_R1: u8 = 0xC3;
pub const STR_R2: u8 = 0xC4;
pub const STR_R3: u8 = 0xC5;
pub const STR_R4: u8 = 0xC6;

// Numbers
pub const NUMBER_UINT64: u8 = 0xC7;
pub const NUMBER_UINT8: u8 = 0xC8;
pub const NUMBER_INT16: u8 = 0xC9;
pub const NUMBER_INT32: u8 = 0xCA;
pub const NUMBER_INT64: u8 = 0xCB;
pub const NUMBER_DOUBLE: u8 = 0xCC;
pub const FLOAT32: u8 = 0xCD;
pub const FLOAT64: u8 = 0xCE;
pub const FLOAT16: u8 = 0xCF;

// Other scalars
pub const NULL: u8 = 0xD0;
pub const FALSE: u8 = 0xD1;
pub const TRUE: u8 = 0xD2;
pub const GUID: u8 = 0xD3;

// Extended integers
pub const UINT8: u8 = 0xD7;
pub const INT8: u8 = 0xD8;
pub const INT16: u8 = 0xD9;
pub const INT32: u8 = 0xDA;
pub const INT64: u8 = 0xDB;
pub const UINT32: u8 = 0xDC;

// Binary payloads
pub const BIN_L1: u8 = 0xDD;
pub const BIN_L2: u8 = 0xDE;
pub const BIN_L4: u8 = 0xDF;

// Arrays
pub const ARR0: u8 = 0xE0;
pub const ARR1: u8 = 0xE1;
pub const ARR_L1: u8 = 0xE2;
pub const ARR_L2: u8 = 0xE3;
pub const ARR_L4: u8 = 0xE4;
pub const ARR_LC1: u8 = 0xE5;
pub const ARR_LC2: u8 = 0xE6;
pub const ARR_LC4: u8 = 0xE7;

// Objects
pub const OBJ0: u8 = 0xE8;
pub const OBJ1: u8 = 0xE9;
pub const OBJ_L1: u8 = 0xEA;
pub const OBJ_L2: u8 = 0xEB;
pub const OBJ_L4: u8 = 0xEC;
pub const OBJ_LC1: u8 = 0xED;
pub const OBJ_LC2: u8 = 0xEE;
pub const OBJ_LC4: u8 = 0xEF;

// Uniform number arrays (reserved, never written)
pub const ARR_NUM_C1: u8 = 0xF0;
pub const ARR_ARR_NUM_C2_C2: u8 = 0xF3;

pub const INVALID: u8 = 0xFF;

/// Number of string ids addressable by the one-byte user string range.
pub const USER_STRING_1_BYTE_COUNT: usize = (USER_STRING_1_BYTE_MAX - USER_STRING_1_BYTE_MIN) as usize;
/// Total user string ids: the one-byte range plus 255 ids per two-byte marker.
pub const USER_STRING_CAPACITY: usize = USER_STRING_1_BYTE_COUNT
    + (USER_STRING_2_BYTE_MAX - USER_STRING_2_BYTE_MIN) as usize * 0xFF;
/// Longest string that still fits an encoded-length marker.
pub const MAX_ENCODED_LENGTH_STRING: usize = (ENCODED_LENGTH_STRING_MAX - ENCODED_LENGTH_STRING_MIN) as usize - 1;

#[inline]
fn in_range(marker: u8, min: u8, max: u8) -> bool {
    marker >= min && marker < max
}

pub fn is_literal_int(marker: u8) -> bool {
    marker < LITERAL_INT_MAX
}

/// Marker for an immediate integer, if `value` is in `0..=31`.
pub fn literal_int_marker(value: i64) -> Option<u8> {
    if (0..LITERAL_INT_MAX as i64).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

pub fn is_system_string(marker: u8) -> bool {
    in_range(marker, SYSTEM_STRING_MIN, SYSTEM_STRING_MAX)
}

pub fn is_one_byte_user_string(marker: u8) -> bool {
    in_range(marker, USER_STRING_1_BYTE_MIN, USER_STRING_1_BYTE_MAX)
}

pub fn is_two_byte_user_string(marker: u8) -> bool {
    in_range(marker, USER_STRING_2_BYTE_MIN, USER_STRING_2_BYTE_MAX)
}

pub fn is_user_string(marker: u8) -> bool {
    is_one_byte_user_string(marker) || is_two_byte_user_string(marker)
}

pub fn is_guid_string(marker: u8) -> bool {
    in_range(marker, LOWERCASE_GUID_STRING, DOUBLE_QUOTED_LOWERCASE_GUID_STRING + 1)
}

pub fn is_hex_string(marker: u8) -> bool {
    marker == COMPRESSED_LOWERCASE_HEX_STRING || marker == COMPRESSED_UPPERCASE_HEX_STRING
}

pub fn is_date_time_string(marker: u8) -> bool {
    marker == COMPRESSED_DATE_TIME_STRING
}

pub fn is_packed_string(marker: u8) -> bool {
    in_range(marker, PACKED_4_BIT_STRING, PACKED_7_BIT_STRING_LENGTH_2 + 1)
}

/// Any string form whose bytes must be decoded rather than borrowed.
pub fn is_compressed_string(marker: u8) -> bool {
    in_range(marker, LOWERCASE_GUID_STRING, PACKED_7_BIT_STRING_LENGTH_2 + 1)
}

pub fn is_encoded_length_string(marker: u8) -> bool {
    in_range(marker, ENCODED_LENGTH_STRING_MIN, ENCODED_LENGTH_STRING_MAX)
}

/// Marker that carries `length` inline, for strings shorter than 64 bytes.
pub fn encoded_length_string_marker(length: usize) -> Option<u8> {
    if length <= MAX_ENCODED_LENGTH_STRING {
        Some(ENCODED_LENGTH_STRING_MIN + length as u8)
    } else {
        None
    }
}

pub fn encoded_string_length(marker: u8) -> usize {
    (marker & 0x3F) as usize
}

pub fn is_reference_string(marker: u8) -> bool {
    in_range(marker, STR_R1, STR_R4 + 1)
}

pub fn is_string(marker: u8) -> bool {
    in_range(marker, SYSTEM_STRING_MIN, USER_STRING_2_BYTE_MAX)
        || is_compressed_string(marker)
        || in_range(marker, ENCODED_LENGTH_STRING_MIN, STR_R4 + 1)
}

/// Markers surfaced as generic `Number` tokens.
pub fn is_number(marker: u8) -> bool {
    is_literal_int(marker)
        || in_range(marker, NUMBER_UINT64, NUMBER_DOUBLE + 1)
        || marker == FLOAT16
        || marker == UINT8
}

pub fn is_array(marker: u8) -> bool {
    in_range(marker, ARR0, ARR_LC4 + 1)
}

pub fn is_object(marker: u8) -> bool {
    in_range(marker, OBJ0, OBJ_LC4 + 1)
}

pub fn is_binary(marker: u8) -> bool {
    in_range(marker, BIN_L1, BIN_L4 + 1)
}

pub fn is_uniform_number_array(marker: u8) -> bool {
    in_range(marker, ARR_NUM_C1, ARR_ARR_NUM_C2_C2 + 1)
}
