//! Steps 1-5 of the per-frame decoding pipeline: differential decode, descramble,
//! differential precoding inverse, de-interleave, and the rate-1/2 convolutional
//! channel decode with erasure flagging (PAS 0001-2 6.1.2 / 6.2.2).

use crate::tables::{DIFF_PRECOD_UHF, FRAME_DATA_LEN, INTERLEAVE_DATA_UHF, SCRAMB_TABLE};

/// Step 1. Undoes the channel's differential encoding of the raw payload bits, seed 0.
///
/// Shared across every SCR candidate - the caller runs this exactly once per raw frame,
/// before branching into per-key descrambling.
pub(crate) fn differential_decode(payload: &mut [u8; FRAME_DATA_LEN]) {
    let mut last = 0u8;
    for bit in payload.iter_mut() {
        *bit ^= last;
        last = *bit;
    }
}

/// Step 2. No-op for `scr == 0`; otherwise an involution (applying it twice with the
/// same key is the identity).
pub(crate) fn descramble(payload: &mut [u8; FRAME_DATA_LEN], scr: u8) {
    if scr == 0 {
        return;
    }
    for (k, bit) in payload.iter_mut().enumerate() {
        *bit ^= SCRAMB_TABLE[(k + scr as usize) % 127];
    }
}

/// Step 3, UHF band only.
pub(crate) fn diff_precode_inverse_uhf(payload: &mut [u8; FRAME_DATA_LEN]) {
    for j in (1..FRAME_DATA_LEN).rev() {
        payload[j] ^= payload[j - DIFF_PRECOD_UHF[j] as usize];
    }
}

/// Step 4, UHF data (control-channel) table.
pub(crate) fn deinterleave_uhf(payload: &[u8; FRAME_DATA_LEN]) -> [u8; FRAME_DATA_LEN] {
    let mut out = [0u8; FRAME_DATA_LEN];
    for j in 0..FRAME_DATA_LEN {
        out[j] = payload[INTERLEAVE_DATA_UHF[j] as usize];
    }
    out
}

/// Result of step 5: 76 decoded bits, one erasure flag per bit, and the total error count.
pub(crate) struct ChannelDecode {
    pub(crate) data: [u8; 76],
    pub(crate) erasures: [u8; 76],
    pub(crate) errors: usize,
}

/// Step 5. Runs the redundant-derivation recovery rule over both segments (26 bits
/// modulo 52, then 50 bits modulo 100) and concatenates the results.
pub(crate) fn channel_decode(deinterleaved: &[u8; FRAME_DATA_LEN]) -> ChannelDecode {
    let mut data = [0u8; 76];
    let mut erasures = [0u8; 76];
    let mut errors = 0;
    errors += channel_decode_segment(&deinterleaved[0..52], 52, &mut data[0..26], &mut erasures[0..26]);
    errors += channel_decode_segment(
        &deinterleaved[52..152],
        100,
        &mut data[26..76],
        &mut erasures[26..76],
    );
    ChannelDecode {
        data,
        erasures,
        errors,
    }
}

fn channel_decode_segment(input: &[u8], modulus: usize, out: &mut [u8], err: &mut [u8]) -> usize {
    let mut errors = 0;
    for i in 0..out.len() {
        let get = |offset: usize| input[(2 * i + offset) % modulus];
        let res = get(2) ^ get(3);
        let alt = get(5) ^ get(6) ^ get(7);
        let e = res ^ alt;
        out[i] = res;
        err[i] = e;
        errors += e as usize;
    }
    errors
}

/// Runs steps 2-5 for the UHF band against a candidate key, on a scratch copy of the
/// already differentially-decoded raw payload.
pub(crate) fn run_uhf(payload: &[u8; FRAME_DATA_LEN], scr: u8) -> ChannelDecode {
    let mut scratch = *payload;
    descramble(&mut scratch, scr);
    diff_precode_inverse_uhf(&mut scratch);
    let deinterleaved = deinterleave_uhf(&scratch);
    channel_decode(&deinterleaved)
}
