//! Fixed constants that are part of the external wire-format contract (PAS 0001-2).
//!
//! Every table here must match the standard bit-for-bit; none of these values are
//! tuning knobs.

pub(crate) const FRAME_HDR_LEN: usize = 8;
pub(crate) const FRAME_DATA_LEN: usize = 152;
pub(crate) const FRAME_LEN: usize = FRAME_HDR_LEN + FRAME_DATA_LEN;

pub(crate) const MAX_FRAME_SYNC_ERR: u8 = 1;

pub(crate) const SCR_CANDIDATES: usize = 128;
pub(crate) const FRAME_NO_MODULUS: u16 = 200;

/// Data-frame type indicator expected in `data[0]` of a decoded control-channel frame.
pub(crate) const FRAME_TYPE_DATA_BIT: u8 = 1;

/// Differentially-encoded frame synchronization pattern, header offsets 1..7 (offset 0
/// is the differential seed bit and is not part of the comparison).
pub(crate) const SYNC_WORD: [u8; 7] = [1, 0, 1, 0, 0, 1, 1];

/// LFSR scrambling sequence, PAS 0001-2 6.1.5.1 / 6.2.5.1 / 6.3.4.1.
///
/// `s[0..6] = 1`, `s[k] = s[k-1] XOR s[k-7]` for `k` in `7..127`.
pub(crate) const SCRAMB_TABLE: [u8; 127] = [
    1, 1, 1, 1, 1, 1, 1, 0, 1, 0, 1, 0, 1, 0, 0, 1, 1, 0, 0, 1, 1, 1, 0, 1, 1, 1, 0, 1, 0, 0, 1, 0,
    1, 1, 0, 0, 0, 1, 1, 0, 1, 1, 1, 1, 0, 1, 1, 0, 1, 0, 1, 1, 0, 1, 1, 0, 0, 1, 0, 0, 1, 0, 0, 0,
    1, 1, 1, 0, 0, 0, 0, 1, 0, 1, 1, 1, 1, 1, 0, 0, 1, 0, 1, 0, 1, 1, 1, 0, 0, 1, 1, 0, 1, 0, 0, 0,
    1, 0, 0, 1, 1, 1, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0,
];

/// Differential precoding tap table for the UHF band, PAS 0001-2 6.1.4.2 / 6.2.4.2.
///
/// Entry `j` gives the distance back to XOR against when inverting the precoder at
/// position `j`.
pub(crate) const DIFF_PRECOD_UHF: [u8; FRAME_DATA_LEN] = [
    1, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2,
    1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1,
    2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 1, 1, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2,
    1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1,
    2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1, 2, 1, 1,
];

/// Control-channel (data) de-interleave permutation for the UHF band, PAS 0001-2 6.2.4.1.
///
/// `out[j] = in[INTERLEAVE_DATA_UHF[j]]`.
pub(crate) const INTERLEAVE_DATA_UHF: [u8; FRAME_DATA_LEN] = [
    1, 77, 38, 114, 20, 96, 59, 135, 3, 79, 41, 117, 23, 99, 62, 138, 5, 81, 44, 120, 26, 102, 65,
    141, 8, 84, 47, 123, 29, 105, 68, 144, 11, 87, 50, 126, 32, 108, 71, 147, 14, 90, 53, 129, 35,
    111, 74, 150, 17, 93, 56, 132, 37, 112, 76, 148, 2, 88, 40, 115, 19, 97, 58, 133, 4, 75, 43,
    118, 22, 100, 61, 136, 7, 85, 46, 121, 25, 103, 64, 139, 10, 82, 49, 124, 28, 106, 67, 142, 13,
    91, 52, 127, 31, 109, 73, 145, 16, 94, 55, 130, 34, 113, 70, 151, 0, 80, 39, 116, 21, 95, 57,
    134, 6, 78, 42, 119, 24, 98, 60, 137, 9, 83, 45, 122, 27, 101, 63, 140, 12, 86, 48, 125, 30,
    104, 66, 143, 15, 89, 51, 128, 33, 107, 69, 146, 18, 92, 54, 131, 36, 110, 72, 149,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_lengths() {
        assert_eq!(SCRAMB_TABLE.len(), 127);
        assert_eq!(DIFF_PRECOD_UHF.len(), FRAME_DATA_LEN);
        assert_eq!(INTERLEAVE_DATA_UHF.len(), FRAME_DATA_LEN);
    }

    #[test]
    fn diff_precod_entries_are_one_or_two() {
        assert!(DIFF_PRECOD_UHF.iter().all(|&v| v == 1 || v == 2));
    }

    #[test]
    fn interleave_table_is_a_permutation() {
        let mut seen = [false; FRAME_DATA_LEN];
        for &idx in INTERLEAVE_DATA_UHF.iter() {
            assert!(!seen[idx as usize], "index {idx} repeated");
            seen[idx as usize] = true;
        }
    }
}
