//! Cursor and patching behavior the binary codec leans on.

use docjson_buffers::{BufferError, Reader, Writer};

#[test]
fn every_width_at_its_extremes() {
    let mut w = Writer::new();
    w.u8(u8::MAX);
    w.i8(i8::MIN);
    w.u16(u16::MAX);
    w.i16(i16::MIN);
    w.u24(0x00FF_FFFF);
    w.u32(u32::MAX);
    w.i32(i32::MIN);
    w.u64(u64::MAX);
    w.i64(i64::MIN);
    w.f32(f32::MIN_POSITIVE);
    w.f64(-0.0);
    assert_eq!(w.len(), 1 + 1 + 2 + 2 + 3 + 4 + 4 + 8 + 8 + 4 + 8);
    let data = w.flush();

    let mut r = Reader::new(&data);
    assert_eq!(r.u8(), Ok(u8::MAX));
    assert_eq!(r.i8(), Ok(i8::MIN));
    assert_eq!(r.u16(), Ok(u16::MAX));
    assert_eq!(r.i16(), Ok(i16::MIN));
    assert_eq!(r.u24(), Ok(0x00FF_FFFF));
    assert_eq!(r.u32(), Ok(u32::MAX));
    assert_eq!(r.i32(), Ok(i32::MIN));
    assert_eq!(r.u64(), Ok(u64::MAX));
    assert_eq!(r.i64(), Ok(i64::MIN));
    assert_eq!(r.f32(), Ok(f32::MIN_POSITIVE));
    assert_eq!(r.f64().map(f64::to_bits), Ok((-0.0f64).to_bits()));
    assert!(r.is_eof());
}

#[test]
fn nan_payload_survives() {
    let nan = f64::from_bits(0x7FF8_0000_0000_0001);
    let mut w = Writer::new();
    w.f64(nan);
    let data = w.flush();
    assert_eq!(Reader::new(&data).f64().map(f64::to_bits), Ok(nan.to_bits()));
}

#[test]
fn short_reads_report_position_and_need() {
    let data = [1, 2, 3];
    let cases: [(fn(&mut Reader<'_>) -> Result<(), BufferError>, usize); 4] = [
        (|r| r.u32().map(drop), 4),
        (|r| r.u64().map(drop), 8),
        (|r| r.f64().map(drop), 8),
        (|r| r.buf(5).map(drop), 5),
    ];
    for (read, needed) in cases {
        let mut r = Reader::new(&data);
        r.skip(1).unwrap();
        assert_eq!(read(&mut r), Err(BufferError::EndOfBuffer { at: 1, needed }));
        assert_eq!(r.x, 1);
    }
}

#[test]
fn sliced_reader_stops_at_its_end() {
    let data = [0xAA, 0x01, 0x02, 0xBB];
    let mut r = Reader::from_slice(&data, 1, 3);
    assert_eq!(r.size(), 2);
    assert_eq!(r.u16(), Ok(0x0201));
    assert!(r.is_eof());
    assert_eq!(r.peek(), Err(BufferError::EndOfBuffer { at: 3, needed: 1 }));
    assert_eq!(Reader::from_slice(&data, 0, 99).size(), 4);
}

#[test]
fn borrowed_strings_outlive_the_cursor() {
    let data = b"\x03abc\x02\xc3\xa9";
    let first;
    let second;
    {
        let mut r = Reader::new(data);
        let n = r.u8().unwrap() as usize;
        first = r.utf8(n).unwrap();
        let n = r.u8().unwrap() as usize;
        second = r.utf8(n).unwrap();
    }
    assert_eq!((first, second), ("abc", "é"));
}

#[test]
fn header_grows_after_payload_is_known() {
    let payload: Vec<u8> = (0..300u16).map(|i| i as u8).collect();
    let mut w = Writer::new();
    w.u8(0xE2);
    let header = w.len();
    w.u8(0);
    w.buf(&payload);

    w.resize_region(header, 1, 2).unwrap();
    w.patch_u16(header, payload.len() as u16).unwrap();
    let data = w.flush();

    let mut r = Reader::new(&data);
    assert_eq!(r.u8(), Ok(0xE2));
    assert_eq!(r.u16(), Ok(300));
    assert_eq!(r.buf(300), Ok(&payload[..]));
    assert!(r.is_eof());
}

#[test]
fn edits_outside_written_bytes_fail() {
    let mut w = Writer::new();
    w.u16(0);
    assert_eq!(w.patch_u32(0, 1), Err(BufferError::Overflow));
    assert_eq!(w.patch_u24(1, 1), Err(BufferError::Overflow));
    assert_eq!(w.resize_region(2, 1, 4), Err(BufferError::Overflow));
    assert_eq!(w.resize_region(2, 0, 1), Ok(()));
    assert_eq!(w.as_slice(), &[0, 0, 0]);
}

#[test]
fn truncate_and_reset() {
    let mut w = Writer::with_capacity(8);
    w.utf8("abcdef");
    w.truncate(2);
    assert_eq!(w.as_slice(), b"ab");
    w.reset();
    assert!(w.is_empty());
    w.u8(7);
    assert_eq!(w.flush(), vec![7]);
}
