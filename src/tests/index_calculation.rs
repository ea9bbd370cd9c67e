use super::helpers::histo64;

#[test]
fn unit_magnitude_0_geometry() {
    let h = histo64(1, 1_u64 << 32, 3);
    // 3 sigfig needs single-unit resolution to 2000, rounded up to 2^11
    assert_eq!(2048, h.sub_bucket_count);
    assert_eq!(0, h.unit_magnitude);
    // 2^11 << 22 exceeds 2^32, for 23 buckets total
    assert_eq!(23, h.bucket_count);
    assert_eq!(24 * 1024, h.counts.len());
}

#[test]
fn unit_magnitude_0_index_calculations() {
    let h = histo64(1, 1_u64 << 32, 3);

    // first half of bucket 0
    assert_eq!(0, h.bucket_for(3));
    assert_eq!(3, h.sub_bucket_for(3, 0));
    assert_eq!(Some(3), h.index_for(3));

    // second half of bucket 0
    assert_eq!(0, h.bucket_for(1024 + 3));
    assert_eq!(1024 + 3, h.sub_bucket_for(1024 + 3, 0));
    assert_eq!(Some(1024 + 3), h.index_for(1024 + 3));

    // bucket 1 (top half only), counting by 2s
    assert_eq!(1, h.bucket_for(2048 + 3 * 2));
    assert_eq!(1024 + 3, h.sub_bucket_for(2048 + 3 * 2, 1));
    assert_eq!(Some(2 * 1024 + 3), h.index_for(2048 + 3 * 2));

    // bucket 2, counting by 4s
    assert_eq!(2, h.bucket_for((2048 << 1) + 3 * 4));
    assert_eq!(1024 + 3, h.sub_bucket_for((2048 << 1) + 3 * 4, 2));
    assert_eq!(Some(3 * 1024 + 3), h.index_for((2048 << 1) + 3 * 4));
}

#[test]
fn unit_magnitude_12_index_calculations() {
    let h = histo64(1_u64 << 12, 1_u64 << 32, 3);
    assert_eq!(2048, h.sub_bucket_count);
    assert_eq!(12, h.unit_magnitude);
    // 2^11 << 12 is 2^23; 10 more doublings cover 2^32, for 11 buckets
    assert_eq!(11, h.bucket_count);
    let unit = 1_u64 << 12;

    // first half of bucket 0
    assert_eq!(0, h.bucket_for(3 * unit));
    assert_eq!(3, h.sub_bucket_for(3 * unit, 0));

    // second half of bucket 0
    assert_eq!(0, h.bucket_for(unit * (1024 + 3)));
    assert_eq!(1024 + 3, h.sub_bucket_for(unit * (1024 + 3), 0));

    // bucket 1, scale = unit << 1
    let value = (unit << 11) + 3 * (unit << 1);
    assert_eq!(1, h.bucket_for(value));
    assert_eq!(1024 + 3, h.sub_bucket_for(value, 1));
}

#[test]
fn index_for_value_past_the_array_is_none() {
    let h = histo64(1, 100, 3);
    // 100 needs one bucket; far larger values map past the array
    assert!(h.index_for(100).is_some());
    assert_eq!(None, h.index_for(1_u64 << 40));
    assert_eq!(None, h.index_for(u64::max_value()));
}
