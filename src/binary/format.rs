//! Sector file format constants.

/// Magic number at the start of every sector header ("FD3I" read big-endian).
pub const SECTOR_MAGIC: u32 = 0x4644_3349;

/// Size of the `u32` sector byte length that precedes each header.
pub const SECTOR_LENGTH_SIZE: usize = 4;

/// Size of the sector header following the length field:
/// magic, two versions, two ids, two bbox corners, array count.
pub const SECTOR_HEADER_SIZE: usize = 4 + 4 + 4 + 8 + 8 + 12 + 12 + 4;

/// Every node id is a 7-byte big-endian unsigned integer.
pub const BYTES_PER_NODE_ID: usize = 7;

/// Highest Fibonacci term index a codeword may use.
/// Any 53-bit integer fits in 77 bits of Fibonacci code.
pub const FIBONACCI_MAX_LENGTH: usize = 77;

/// Fibonacci terms 1, 2, 3, 5, 8, ... for term indices `0..=FIBONACCI_MAX_LENGTH`.
pub static FIBONACCI_LOOKUP: [u64; FIBONACCI_MAX_LENGTH + 1] = build_fibonacci_lookup();

const fn build_fibonacci_lookup() -> [u64; FIBONACCI_MAX_LENGTH + 1] {
    let mut table = [0u64; FIBONACCI_MAX_LENGTH + 1];
    table[0] = 1;
    table[1] = 2;
    let mut i = 2;
    while i <= FIBONACCI_MAX_LENGTH {
        table[i] = table[i - 1] + table[i - 2];
        i += 1;
    }
    table
}

/// Width of one value, in bytes, for fixed-width property columns.
pub const COLOR_WIDTH: u32 = 4;
pub const NORMAL_WIDTH: u32 = 12;
pub const FILE_ID_WIDTH: u32 = 8;
pub const SCALAR_WIDTH: u32 = 4;

/// Mask for a 7-byte node id.
#[inline]
pub const fn node_id_mask() -> u64 {
    (1u64 << (BYTES_PER_NODE_ID * 8)) - 1
}
