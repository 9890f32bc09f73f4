use super::*;

#[test]
fn identical_streams_hash_identically() {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    a.write_bytes(b"obelisk");
    a.write_u64(42);
    b.write_bytes(b"obelisk");
    b.write_u64(42);
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn one_byte_difference_changes_the_hash() {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    a.write_u8(1);
    b.write_u8(2);
    assert_ne!(a.finish(), b.finish());
}

#[test]
fn seed_changes_the_hash() {
    let mut a = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    let mut b = Fnv1a64::new(0x9ae1_6a3b_2f90_404f);
    a.write_u32(7);
    b.write_u32(7);
    assert_ne!(a.finish(), b.finish());
}
