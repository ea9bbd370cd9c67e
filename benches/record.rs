#![feature(test)]

extern crate test;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use student_histogram::serialization::{Deserializer, Serializer};
use student_histogram::{Histogram, StudentHistogram};
use test::Bencher;

#[bench]
fn record_precalc_random_values(b: &mut Bencher) {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_u64 << 40, 3).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    let values: Vec<u64> = (0..1 << 20).map(|_| rng.gen_range(1..=1_u64 << 40)).collect();
    let mut i = 0;

    b.iter(|| {
        h.record(values[i & 0xF_FFFF]);
        i += 1;
    })
}

#[bench]
fn record_through_facade(b: &mut Bencher) {
    let mut h = StudentHistogram::<u64>::new_with_bounds(1, 1_u64 << 40, 3).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    let values: Vec<u64> = (0..1 << 20).map(|_| rng.gen_range(1..=1_u64 << 40)).collect();
    let mut i = 0;

    b.iter(|| {
        h.record(values[i & 0xF_FFFF]);
        i += 1;
    })
}

#[bench]
fn percentile_full_walk(b: &mut Bencher) {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_u64 << 40, 3).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..1_000_000 {
        h.record(rng.gen_range(1..=1_u64 << 40));
    }

    b.iter(|| h.percentile(99.99).unwrap())
}

#[bench]
fn serialize_1m_values(b: &mut Bencher) {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_u64 << 40, 3).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..1_000_000 {
        h.record(rng.gen_range(1..=1_u64 << 40));
    }
    let mut serializer = Serializer::new();
    let mut buf = Vec::new();

    b.iter(|| {
        buf.clear();
        serializer.serialize(&h, &mut buf).unwrap()
    })
}

#[bench]
fn deserialize_1m_values(b: &mut Bencher) {
    let mut h = Histogram::<u64>::new_with_bounds(1, 1_u64 << 40, 3).unwrap();
    let mut rng = SmallRng::seed_from_u64(1);
    for _ in 0..1_000_000 {
        h.record(rng.gen_range(1..=1_u64 << 40));
    }
    let blob = h.encode().unwrap();
    let mut deserializer = Deserializer::new();

    b.iter(|| {
        let restored: Histogram<u64> = deserializer.deserialize(&mut &blob[..]).unwrap();
        restored
    })
}
