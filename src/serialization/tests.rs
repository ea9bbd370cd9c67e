use super::deserializer::{varint_read, zig_zag_decode, Deserializer};
use super::serializer::{
    counts_max_encoded_size, encode_counts, varint_write, zig_zag_encode, Serializer,
};
use super::V1_HEADER_SIZE;
use crate::Histogram;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;

#[test]
fn varint_write_1_byte() {
    let mut buf = [0_u8; 9];
    assert_eq!(1, varint_write(0, &mut buf));
    assert_eq!(0x00, buf[0]);

    assert_eq!(1, varint_write(127, &mut buf));
    assert_eq!(0x7F, buf[0]);
}

#[test]
fn varint_write_2_bytes() {
    let mut buf = [0_u8; 9];
    assert_eq!(2, varint_write(128, &mut buf));
    assert_eq!([0x80, 0x01], [buf[0], buf[1]]);

    assert_eq!(2, varint_write(16_383, &mut buf));
    assert_eq!([0xFF, 0x7F], [buf[0], buf[1]]);
}

#[test]
fn varint_write_8_bytes_at_56_bit_boundary() {
    let mut buf = [0_u8; 9];
    assert_eq!(8, varint_write((1 << 56) - 1, &mut buf));
    assert_eq!(
        &[0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F],
        &buf[0..8]
    );
}

#[test]
fn varint_write_9_bytes_top_byte_verbatim() {
    let mut buf = [0_u8; 9];
    assert_eq!(9, varint_write(1 << 56, &mut buf));
    // 8 continuation chunks of zeros, then the top 8 bits as-is
    assert_eq!(
        [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01],
        buf
    );

    assert_eq!(9, varint_write(u64::max_value(), &mut buf));
    assert_eq!([0xFF; 9], buf);
}

#[test]
fn varint_round_trip_interesting_values() {
    let mut buf = [0_u8; 9];
    for &v in &[
        0,
        1,
        127,
        128,
        16_383,
        16_384,
        (1 << 56) - 1,
        1 << 56,
        u64::max_value() - 1,
        u64::max_value(),
    ] {
        let len = varint_write(v, &mut buf);
        let read = varint_read(&mut Cursor::new(&buf[0..len])).unwrap();
        assert_eq!(v, read);
    }
}

#[test]
fn varint_round_trip_random() {
    let mut rng = SmallRng::seed_from_u64(0x5732_4CF1);
    let mut buf = [0_u8; 9];
    for _ in 0..100_000 {
        // bias towards varied magnitudes, not just huge numbers
        let v: u64 = rng.gen::<u64>() >> (rng.gen_range(0..64));
        let len = varint_write(v, &mut buf);
        let read = varint_read(&mut Cursor::new(&buf[0..len])).unwrap();
        assert_eq!(v, read);
    }
}

#[test]
fn varint_read_truncated_is_io_error() {
    let mut buf = [0_u8; 9];
    let len = varint_write(u64::max_value(), &mut buf);
    assert!(varint_read(&mut Cursor::new(&buf[0..len - 1])).is_err());
}

#[test]
fn zig_zag_known_mappings() {
    assert_eq!(0, zig_zag_encode(0));
    assert_eq!(1, zig_zag_encode(-1));
    assert_eq!(2, zig_zag_encode(1));
    assert_eq!(3, zig_zag_encode(-2));
    assert_eq!(u64::max_value(), zig_zag_encode(i64::min_value()));
    assert_eq!(u64::max_value() - 1, zig_zag_encode(i64::max_value()));
}

#[test]
fn zig_zag_round_trip() {
    for &v in &[
        0,
        1,
        -1,
        1_000,
        -1_000,
        i64::max_value(),
        i64::min_value(),
    ] {
        assert_eq!(v, zig_zag_decode(zig_zag_encode(v)));
    }
}

#[test]
fn counts_max_encoded_size_is_9_per_count() {
    assert_eq!(Some(9), counts_max_encoded_size(1));
    assert_eq!(Some(9 * 2048), counts_max_encoded_size(2048));
    assert_eq!(None, counts_max_encoded_size(usize::max_value()));
}

#[test]
fn encode_counts_compresses_zero_runs() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_000, 3).unwrap();
    assert!(h.record(1));
    assert!(h.record(1_000));

    let mut buf = [0_u8; 9 * 2048];
    let len = encode_counts(&h, &mut buf).unwrap();

    // literal zero at index 0, count 1 at index 1, a 998-bucket zero run,
    // count 1 at index 1000
    let expected: &[u8] = &[0x00, 0x02, 0xCB, 0x0F, 0x02];
    assert_eq!(expected.len(), len);
    assert_eq!(expected, &buf[0..len]);
}

#[test]
fn encode_counts_empty_histogram_is_single_zero() {
    let h = Histogram::<u64>::new_with_bounds(1, 1_000, 3).unwrap();
    let mut buf = [0_u8; 9];
    let len = encode_counts(&h, &mut buf).unwrap();
    assert_eq!(1, len);
    assert_eq!(0x00, buf[0]);
}

#[test]
fn serializer_reuse_across_histograms() {
    let mut serializer = Serializer::new();
    let mut deserializer = Deserializer::new();

    let mut buf = Vec::new();
    let mut histograms = Vec::new();
    for seed in 1..5_u64 {
        let mut h = Histogram::<u64>::new_with_bounds(1, 100_000, 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(seed);
        for _ in 0..1_000 {
            assert!(h.record(rng.gen_range(1..=100_000)));
        }
        serializer.serialize(&h, &mut buf).unwrap();
        histograms.push(h);
    }

    let mut cursor = Cursor::new(&buf);
    for h in &histograms {
        let decoded: Histogram<u64> = deserializer.deserialize(&mut cursor).unwrap();
        assert_eq!(h, &decoded);
    }
}

#[test]
fn serialized_len_includes_header_and_payload() {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_000, 3).unwrap();
    assert!(h.record(1));
    assert!(h.record(1_000));

    let mut buf = Vec::new();
    let written = Serializer::new().serialize(&h, &mut buf).unwrap();
    assert_eq!(written, buf.len());
    assert_eq!(V1_HEADER_SIZE + 5, written);
}
