//! Bit-partition utility for marginalizing a joint table.

/// All integers in `[0, 2^n)` whose bit `p` (LSB-indexed) is set.
///
/// The returned set and its complement partition `[0, 2^n)` exactly in
/// half: summing a joint table over the result marginalizes the
/// position-`p` variable to "correct". Order carries no meaning.
///
/// Panics if `p >= n` or `n > 30` (the joint table would exceed the
/// encoding cap).
pub fn indices_with_bit(n: u32, p: u32) -> Vec<u32> {
    assert!(p < n, "bit position {p} out of range for {n} bits");
    assert!(n <= 30, "{n} bits exceeds the joint-table cap");

    let mask = 1u32 << p;
    (0..1u32 << n).filter(|index| index & mask != 0).collect()
}
