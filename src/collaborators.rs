//! Traits a caller implements to receive decoded frame content and validate payloads.
//!
//! The reference decoder calls straight into process-global functions for these three
//! concerns (multiblock reassembly, segmentation, CRC checking). Here they are
//! collaborator traits injected into [`crate::PhysicalChannel`] so the core stays free
//! of any particular upper-layer framing or CRC polynomial. Method names mirror the
//! reference's own `multiblock_process`/`multiblock_reset`/`segmentation_reset`/
//! `check_crc` entry points rather than inventing new ones.

/// Frame type passed to [`CrcValidator::check_crc`], mirroring PAS 0001-2's frame-type
/// discriminant. Only control-channel data frames are in this crate's scope (§1); voice
/// and other frame types would add variants here if traffic-channel decoding were ever
/// implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameType {
    Data,
}

/// Feeds one decoded control-channel frame into whatever multiblock reassembly the
/// upper layer implements.
///
/// `block_index` is the frame's position within its multiblock, recovered from the
/// two frame-number bits carried in the decoded payload itself. Determining the end
/// of a multiblock group is a job for the reassembler, not this layer.
pub trait MultiblockSink {
    fn multiblock_process(&mut self, data: &[u8], block_index: u8);

    /// Called whenever frame sync is lost or re-acquired, or a frame fails decode,
    /// type, or CRC checks, so in-progress reassembly can be abandoned rather than
    /// silently stitched across a gap.
    fn multiblock_reset(&mut self);
}

/// Mirrors the reassembly reset lifecycle for whatever higher-layer PDU segmentation
/// the upper layer implements (PAS 0001-3 and above are out of scope here).
///
/// This layer never has decoded PDU bytes of its own to hand over - segmentation sits
/// downstream of multiblock reassembly - but it does need to tell the segmenter to
/// drop anything in flight at the same moments it resets multiblock state.
pub trait SegmentationSink {
    fn segmentation_reset(&mut self);
}

/// Validates a decoded frame's CRC/checksum.
///
/// The core never computes or knows the polynomial; it only acts on the verdict. This
/// mirrors the reference's `decoded_frame_check_crc(decoded_frame, frame_type)` being a
/// link to a table the physical-channel module doesn't own.
pub trait CrcValidator {
    fn check_crc(&mut self, data: &[u8], frame_type: FrameType) -> bool;
}
