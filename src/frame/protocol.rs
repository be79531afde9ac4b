//! # Frame Protocol Constants
//!
//! Layout of a command frame for `k` channels:
//!
//! ```text
//! +--------+--------+--------+--------+-----+--------+--------+
//! | ch0 hi | ch0 lo | ch1 hi | ch1 lo | ... | chk hi | chk lo |
//! +--------+--------+--------+--------+-----+--------+--------+
//! ```
//!
//! Every field is a two's complement `i16`, most significant byte first.

/// Bytes occupied by one channel on the wire
pub const BYTES_PER_CHANNEL: usize = 2;

/// Smallest encodable channel value
pub const FRAME_VALUE_MIN: i32 = i16::MIN as i32;

/// Largest encodable channel value
pub const FRAME_VALUE_MAX: i32 = i16::MAX as i32;

/// Frame length in bytes for `channel_count` channels
#[must_use]
pub const fn frame_len(channel_count: usize) -> usize {
    channel_count * BYTES_PER_CHANNEL
}

/// Formats frame bytes as space-separated uppercase hex (e.g. `27 10 D8 F0`).
#[must_use]
pub fn hex_dump(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
