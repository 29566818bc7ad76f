//! Frame synchronization: finding the PAS 0001-2 sync word in a raw (pre-differential)
//! bitstream, tracking cumulative framing error, and slicing out frame payloads.

use crate::bitbuf::BitBuffer;
use crate::tables::{FRAME_DATA_LEN, FRAME_HDR_LEN, FRAME_LEN, MAX_FRAME_SYNC_ERR, SYNC_WORD};

/// Counts mismatches against the sync word at header offsets 1..7 of `data`.
///
/// Operates on the raw, not-yet-differentially-decoded stream: only signal polarity
/// matters here, which keeps the search free of the error propagation a differential
/// decode would introduce ahead of having sync.
fn cmp_frame_sync(data: &[u8]) -> u8 {
    let mut err = 0u8;
    for (i, &expected) in SYNC_WORD.iter().enumerate() {
        if data[i + 1] != expected {
            err += 1;
        }
    }
    err
}

/// Result of pulling the next frame out of an already-synchronized buffer.
pub(crate) enum FrameOutcome {
    /// A payload was extracted and differentially decoded; the header is discarded.
    Frame([u8; FRAME_DATA_LEN]),
    /// Fewer than `FRAME_LEN` bits are buffered; try again once more bits arrive.
    NeedMoreData,
    /// Cumulative framing error crossed the frame length; synchronization must be
    /// reacquired from scratch.
    SyncLost,
}

pub(crate) struct FrameSynchronizer {
    has_sync: bool,
    last_sync_err: u8,
    total_sync_err: u32,
}

impl FrameSynchronizer {
    pub(crate) fn new() -> Self {
        FrameSynchronizer {
            has_sync: false,
            last_sync_err: 0,
            total_sync_err: 0,
        }
    }

    pub(crate) fn has_sync(&self) -> bool {
        self.has_sync
    }

    pub(crate) fn drop_sync(&mut self) {
        self.has_sync = false;
    }

    /// Scans forward for two consecutive sync words whose combined error is within
    /// budget. Consumes everything up to (and, on success, not including) the match
    /// regardless of outcome - a failed scan still discards the bits it examined, so
    /// the next call resumes from where this one left off.
    pub(crate) fn try_acquire(&mut self, buf: &mut BitBuffer) -> bool {
        let mut offs = 0usize;
        let mut sync_err = MAX_FRAME_SYNC_ERR + 1;
        while offs + FRAME_LEN + FRAME_HDR_LEN < buf.len() {
            let data = &buf.as_slice()[offs..];
            sync_err = cmp_frame_sync(data) + cmp_frame_sync(&data[FRAME_LEN..]);
            if sync_err <= MAX_FRAME_SYNC_ERR {
                break;
            }
            offs += 1;
        }

        buf.advance(offs);

        if sync_err <= MAX_FRAME_SYNC_ERR {
            self.last_sync_err = 0;
            self.total_sync_err = 0;
            self.has_sync = true;
        } else {
            self.has_sync = false;
        }
        self.has_sync
    }

    /// Pulls the next frame's payload out of `buf`, tracking cumulative framing
    /// error. Doubling-plus-one on each bad frame (`1 + 2 * total`) means a run of
    /// consecutive sync mismatches loses lock after exactly 8 frames
    /// (1, 3, 7, 15, 31, 63, 127, 255 >= FRAME_LEN).
    pub(crate) fn next_frame(&mut self, buf: &mut BitBuffer) -> FrameOutcome {
        if buf.len() < FRAME_LEN {
            return FrameOutcome::NeedMoreData;
        }

        let sync_err = cmp_frame_sync(buf.as_slice());
        if sync_err as u32 + self.last_sync_err as u32 > MAX_FRAME_SYNC_ERR as u32 {
            self.total_sync_err = 1 + 2 * self.total_sync_err;
            if self.total_sync_err >= FRAME_LEN as u32 {
                return FrameOutcome::SyncLost;
            }
        } else {
            self.total_sync_err = 0;
        }
        self.last_sync_err = sync_err;

        let mut payload = [0u8; FRAME_DATA_LEN];
        payload.copy_from_slice(&buf.as_slice()[FRAME_HDR_LEN..FRAME_HDR_LEN + FRAME_DATA_LEN]);
        crate::pipeline::differential_decode(&mut payload);
        buf.advance(FRAME_LEN);

        FrameOutcome::Frame(payload)
    }
}
