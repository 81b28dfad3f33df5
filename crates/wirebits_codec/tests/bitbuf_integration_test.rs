//! Integration tests for message encoding through the public API.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wirebits_codec::{
    Angles, BitBufError, BitReader, BitWriter, CodecConfig, CoordPrecision, Direction, Vec3,
    WordBuffer,
};

const GUARD: u8 = 0xA5;

#[test]
fn test_message_flow() {
    let mut storage = WordBuffer::with_capacity_bytes(64);
    let mut writer = BitWriter::new(storage.as_bytes_mut()).with_debug_name("message_flow");

    writer.write_unsigned(5, 3);
    writer.write_one_bit(true);
    writer.write_signed(-300, 12);
    writer.write_var_unsigned(200);
    writer.write_byte(0xFE);
    writer.write_short(-2);
    writer.write_word(0xBEEF);
    writer.write_long(i32::MIN + 1);
    writer.write_long_long(-1_234_567_890_123);
    writer.write_float(3.5);
    writer.write_coord(-512.75);
    writer.write_vec3_coord(Vec3::new(1.0, 0.0, -2.5));
    writer.write_angles(Angles::new(10.0, 20.0, 30.0));
    writer.write_string("hello");
    let len = writer.finish().unwrap();

    let bytes = &storage.as_bytes()[..len];
    let mut reader = BitReader::new(bytes);

    assert_eq!(reader.read_unsigned(3), 5);
    assert!(reader.read_one_bit());
    assert_eq!(reader.read_signed(12), -300);
    assert_eq!(reader.read_var_unsigned(), 200);
    assert_eq!(reader.read_byte(), 0xFE);
    assert_eq!(reader.read_short(), -2);
    assert_eq!(reader.read_word(), 0xBEEF);
    assert_eq!(reader.read_long(), i32::MIN + 1);
    assert_eq!(reader.read_long_long(), -1_234_567_890_123);
    assert_eq!(reader.read_float(), 3.5);
    assert_eq!(reader.read_coord(), -512.75);
    assert_eq!(reader.read_vec3_coord(), Vec3::new(1.0, 0.0, -2.5));
    assert_eq!(reader.read_angles(), Angles::new(10.0, 20.0, 30.0));

    let mut name = [0u8; 16];
    let read = reader.read_string(&mut name, false);
    assert_eq!(&name[..read.len], b"hello");
    assert!(!read.truncated);

    assert!(!reader.is_overflowed());
    assert!(reader.num_bits_left() < 8);
}

#[test]
fn test_overflow_never_touches_guard_bytes() {
    let mut storage = [GUARD; 12];
    {
        let (_, middle) = storage.split_at_mut(4);
        let (body, _) = middle.split_at_mut(4);
        let mut writer = BitWriter::new(body);

        writer.write_unsigned(0xFFFF_FFFF, 30);
        writer.write_string("overflowing");
        writer.write_unsigned(u32::MAX, 32);
        writer.write_coord(1234.5);
        assert!(writer.is_overflowed());
        assert_eq!(writer.num_bits_written(), 30);
    }

    assert_eq!(&storage[..4], &[GUARD; 4]);
    assert_eq!(&storage[8..], &[GUARD; 4]);
}

#[test]
fn test_finish_reports_overflow() {
    let mut buf = [0u8; 2];
    let mut writer = BitWriter::new(&mut buf).with_debug_name("tiny");
    writer.write_long(7);

    match writer.finish() {
        Err(BitBufError::Overflow {
            direction,
            name,
            bit_position,
            capacity_bits,
        }) => {
            assert_eq!(direction, Direction::Write);
            assert_eq!(name, "tiny");
            assert_eq!(bit_position, 0);
            assert_eq!(capacity_bits, 16);
        }
        other => panic!("expected overflow, got {other:?}"),
    }
}

#[test]
fn test_reset_produces_identical_bytes() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x00B1_7B0F);
    let fields: Vec<(u32, u32)> = (0..200)
        .map(|_| (rng.gen::<u32>(), rng.gen_range(1..=32)))
        .collect();

    let mut first = vec![0u8; 1024];
    let mut second = vec![0u8; 1024];

    let mut writer = BitWriter::new(&mut first);
    for &(value, bits) in &fields {
        writer.write_unsigned(value, bits);
    }
    let first_len = writer.finish().unwrap();

    let mut writer = BitWriter::new(&mut second);
    writer.write_string("garbage that reset discards");
    writer.write_unsigned(u32::MAX, 32);
    writer.reset();
    for &(value, bits) in &fields {
        writer.write_unsigned(value, bits);
    }
    let second_len = writer.finish().unwrap();

    assert_eq!(first_len, second_len);
    assert_eq!(first[..first_len], second[..second_len]);
}

#[test]
fn test_reader_overflow_reads_zero() {
    let data = [0xFFu8; 3];
    let mut reader = BitReader::new(&data);

    assert_eq!(reader.read_unsigned(20), 0x000F_FFFF);
    assert_eq!(reader.read_signed(8), 0);
    assert_eq!(reader.read_coord(), 0.0);
    assert_eq!(reader.read_owned_string(false), "");
    assert!(reader.is_overflowed());
    assert_eq!(reader.num_bits_read(), 20);
    assert!(reader.finish().is_err());
}

#[test]
fn test_string_truncation() {
    let mut buf = [0u8; 32];
    let mut writer = BitWriter::new(&mut buf);
    writer.write_string("hello");
    writer.write_string("toolongstring");
    writer.write_string_opt(None);

    let mut reader = BitReader::new(&buf);

    let mut roomy = [0xFFu8; 16];
    let read = reader.read_string(&mut roomy, false);
    assert_eq!(&roomy[..6], b"hello\0");
    assert_eq!(read.len, 5);
    assert!(!read.truncated);

    let mut tight = [0xFFu8; 4];
    let read = reader.read_string(&mut tight, false);
    assert_eq!(&tight, b"too\0");
    assert!(read.truncated);

    let read = reader.read_string(&mut roomy, false);
    assert_eq!(read.len, 0);
    assert_eq!(roomy[0], 0);
    assert!(!reader.is_overflowed());
}

#[test]
fn test_write_bits_from_reader_splices() {
    let mut source = [0u8; 16];
    let mut writer = BitWriter::new(&mut source);
    writer.write_unsigned(0x1234_5678, 32);
    writer.write_unsigned(0x2A, 7);
    let source_bits = writer.num_bits_written();

    let mut dest = [0u8; 16];
    let mut writer = BitWriter::new(&mut dest);
    writer.write_unsigned(0b11, 2);
    let mut reader = BitReader::with_bit_capacity(&source, source_bits);
    assert!(writer.write_bits_from_reader(&mut reader, source_bits));
    assert_eq!(writer.num_bits_written(), 2 + source_bits);

    let mut check = BitReader::new(&dest);
    assert_eq!(check.read_unsigned(2), 0b11);
    assert_eq!(check.read_unsigned(32), 0x1234_5678);
    assert_eq!(check.read_unsigned(7), 0x2A);
}

#[test]
fn test_config_limits_capacity() {
    let config = CodecConfig::from_toml_str("max_packet_bytes = 8\nmax_string_bytes = 4").unwrap();
    let mut storage = vec![0u8; 64];

    let mut writer = BitWriter::from_config(&mut storage, &config);
    assert_eq!(writer.max_num_bits(), 64);
    writer.write_string("abcdefg");
    assert!(!writer.is_overflowed());
    writer.write_one_bit(true);
    assert!(writer.is_overflowed());

    let mut reader = BitReader::from_config(&storage, &config);
    assert_eq!(reader.read_owned_string(false), "abc");
    assert_eq!(reader.num_bits_read(), 64);
}

#[test]
fn test_mp_coords_in_message() {
    let mut buf = [0u8; 32];
    let mut writer = BitWriter::new(&mut buf);
    writer.write_coord_mp(2047.5, CoordPrecision::Full);
    writer.write_coord_mp(-4000.0, CoordPrecision::Integral);
    writer.write_coord_mp(0.0, CoordPrecision::LowPrecision);
    writer.write_angle(180.0, 10);
    writer.write_vec3_normal(Vec3::new(0.0, 0.0, 1.0));
    assert!(!writer.is_overflowed());

    let mut reader = BitReader::new(&buf);
    assert_eq!(reader.read_coord_mp(CoordPrecision::Full), 2047.5);
    assert_eq!(reader.read_coord_mp(CoordPrecision::Integral), -4000.0);
    assert_eq!(reader.read_coord_mp(CoordPrecision::LowPrecision), 0.0);
    assert_eq!(reader.read_angle(10), 180.0);
    assert_eq!(reader.read_vec3_normal(), Vec3::new(0.0, 0.0, 1.0));
}
