//! Blind detection of the scrambling constant (SCR) by scoring all 128 candidates
//! against the redundant-derivation error rate and CRC outcome of a trial decode
//! (PAS 0001-2 6.1.5 discovery procedure).

use crate::collaborators::FrameType;
use crate::pipeline::run_uhf;
use crate::tables::SCR_CANDIDATES;

pub(crate) struct ScrDetector {
    stat: [i32; SCR_CANDIDATES],
    confidence: i32,
}

/// Winner of a scoring pass: the best-scoring candidate, and whether its lead over
/// the runner-up was wide enough to commit to it.
pub(crate) struct ScrOutcome {
    pub(crate) guess: u8,
    pub(crate) committed: bool,
}

impl ScrDetector {
    pub(crate) fn new(confidence: i32) -> Self {
        ScrDetector {
            stat: [0; SCR_CANDIDATES],
            confidence,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.stat = [0; SCR_CANDIDATES];
    }

    pub(crate) fn set_confidence(&mut self, confidence: i32) {
        self.confidence = confidence;
    }

    pub(crate) fn confidence(&self) -> i32 {
        self.confidence
    }

    /// Scores every candidate SCR against one differentially-decoded frame and
    /// returns the current best guess.
    ///
    /// A candidate whose trial decode has any erasure, or whose resulting frame
    /// fails the CRC, loses 2 points (floored at 0); a clean, CRC-valid decode gains
    /// 1 point. Unlike the CCH pipeline proper, the frame-type bit is not checked
    /// here - detection only gates on decode errors and CRC outcome. Ties are
    /// resolved in ascending candidate order: the loop walks candidates 0..128 and
    /// promotes a tie (`>=`) to the new leader, so the higher-numbered candidate of
    /// an exact tie wins. This mirrors the reference scan order exactly and is not
    /// a symmetric top-2 selection.
    pub(crate) fn update(
        &mut self,
        payload: &[u8; crate::tables::FRAME_DATA_LEN],
        crc: &mut impl crate::collaborators::CrcValidator,
    ) -> ScrOutcome {
        for scr in 0..SCR_CANDIDATES {
            let decoded = run_uhf(payload, scr as u8);
            let ok = decoded.errors == 0 && crc.check_crc(&decoded.data, FrameType::Data);
            if ok {
                self.stat[scr] += 1;
            } else {
                self.stat[scr] -= 2;
                if self.stat[scr] < 0 {
                    self.stat[scr] = 0;
                }
            }
        }

        let mut best = 0usize;
        let mut second = 1usize;
        if self.stat[0] < self.stat[1] {
            best = 1;
            second = 0;
        }
        for scr in 2..SCR_CANDIDATES {
            if self.stat[scr] >= self.stat[best] {
                second = best;
                best = scr;
            }
        }

        let committed = self.stat[best] - self.confidence > self.stat[second];
        ScrOutcome {
            guess: best as u8,
            committed,
        }
    }
}
