//! Legacy JPEG reconstruction payload.
//!
//! When a codestream was produced by transcoding an existing JPEG, the
//! caller may supply the reconstruction side-data up front and ask for it
//! to be carried on the first decoded frame. The payload is opaque to this
//! crate except for its collection of tagged app-marker byte ranges, which
//! the ICC reconciler fills in.

use alloc::vec::Vec;

/// Byte offset of the payload proper inside an ICC app marker: marker
/// bytes, length field, "ICC_PROFILE\0" tag, and chunk indices.
pub const ICC_MARKER_HEADER_LEN: usize = 17;

/// What an app-marker byte range carries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarkerKind {
    /// One chunk of the embedded ICC profile.
    Icc,
    Exif,
    Xmp,
    Unknown,
}

/// One tagged byte range of the reconstruction payload.
#[derive(Clone, Debug)]
pub struct AppMarker {
    pub kind: MarkerKind,
    pub data: Vec<u8>,
}

/// Reconstruction side-data carried alongside the first frame.
#[derive(Clone, Debug, Default)]
pub struct LegacyPayload {
    /// App markers in codestream order; ICC-tagged ranges receive their
    /// slice of the decoded profile during reconciliation.
    pub app_markers: Vec<AppMarker>,
}
