//! Bitmask encoding for the weekly topup schedule.
//!
//! The device stores the active days as a 7-bit mask: bit `i` (from the
//! least significant end) is set when weekday `i + 1` is active, so
//! Monday lives in bit 0 and Sunday in bit 6.

use crate::domain::{Weekday, WeekdaySet};

pub fn encode_days(days: &WeekdaySet) -> u8 {
    days.iter()
        .fold(0, |mask, day| mask | 1 << (day.number() - 1))
}

/// Inverse of [`encode_days`]. Bit 7 is unused on the wire and ignored.
pub fn decode_days(mask: u8) -> WeekdaySet {
    Weekday::ALL
        .into_iter()
        .filter(|day| mask >> (day.number() - 1) & 1 == 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn days(numbers: &[u8]) -> WeekdaySet {
        numbers
            .iter()
            .map(|n| Weekday::from_number(*n).expect("weekday"))
            .collect()
    }

    #[test]
    fn encodes_known_masks() {
        assert_eq!(encode_days(&days(&[])), 0);
        assert_eq!(encode_days(&days(&[1, 7])), 0b100_0001);
        assert_eq!(encode_days(&days(&[1, 3, 5])), 21);
        assert_eq!(encode_days(&days(&[1, 2, 3, 4, 5, 6, 7])), 127);
    }

    #[test]
    fn decodes_known_masks() {
        assert_eq!(decode_days(2), days(&[2]));
        assert_eq!(decode_days(127), days(&[1, 2, 3, 4, 5, 6, 7]));
        assert_eq!(decode_days(0), WeekdaySet::new());
    }

    #[test]
    fn round_trips_every_seven_bit_mask() {
        for mask in 0u8..128 {
            let decoded = decode_days(mask);
            assert_eq!(encode_days(&decoded), mask);
            assert_eq!(decode_days(encode_days(&decoded)), decoded);
        }
    }

    #[test]
    fn decode_ignores_the_unused_high_bit() {
        assert_eq!(decode_days(0b1000_0000), WeekdaySet::new());
        assert_eq!(decode_days(0b1000_0010), days(&[2]));
    }
}
