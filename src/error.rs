use alloc::string::String;

/// Errors from decoding a JPEG XL codestream.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum JxlError {
    #[error("file does not start with a JPEG XL codestream signature")]
    BadSignature,

    /// The caller broke an API contract (e.g. requested legacy payload
    /// retention without supplying one). Not a parse error.
    #[error("contract violation: {0}")]
    ContractViolation(&'static str),

    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("dimensions {width}x{height} exceed decoder limits")]
    DimensionLimitExceeded { width: u32, height: u32 },

    #[error(
        "ICC profile shorter than legacy markers: requested {requested} more bytes, \
         {available} available"
    )]
    IccUnderrun { requested: usize, available: usize },

    #[error("ICC profile longer than legacy markers: {leftover} bytes left over")]
    IccOverrun { leftover: usize },

    #[error("preview decoding forced on but the bitstream declares no preview")]
    PreviewRequestedButAbsent,

    #[error("cannot retain a legacy payload when decoding an animation")]
    AnimationIncompatibleWithLegacyPayload,

    /// Failure reported by the frame-decode collaborator.
    #[error("frame decode failed: {0}")]
    FrameDecode(String),

    #[error("bitstream not fully consumed: {consumed_bits} of {total_bits} bits read")]
    TrailingOrMissingData { consumed_bits: u64, total_bits: u64 },

    #[error("read past end of bitstream")]
    UnexpectedEof,
}
