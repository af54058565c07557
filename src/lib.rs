//! # zenjxl
//!
//! Top-level decode orchestrator for JPEG XL codestreams: turns a flat
//! byte buffer into global metadata, an optional preview, and an ordered
//! sequence of full-resolution frames.
//!
//! This crate owns the bitstream layout and sequencing; the expensive
//! collaborators are consumed through narrow seams:
//!
//! - per-frame pixel decoding through the [`FrameCodec`] trait;
//! - colorspace transforms through a hook installed into the per-decode
//!   state ([`ColorTransformFn`]);
//! - threading through the [`WorkerPool`] capability, only ever forwarded.
//!
//! ## What it handles
//!
//! - Size, metadata, and transform headers (with the XYB-encoded flag
//!   cross-referenced between blocks)
//! - Embedded ICC profiles, including redistribution into a legacy JPEG
//!   reconstruction payload's app markers
//! - Preview frames: absent, skipped, or decoded, per [`Override`]
//! - Multi-frame sequencing until the last-frame flag, with reference-only
//!   frames consumed but not emitted
//! - Strict end-of-stream validation and partial-file tolerance
//!
//! ## Non-Goals
//!
//! - Pixel reconstruction from coefficients (bring a [`FrameCodec`])
//! - ICC profile semantics — only byte extents and routing
//! - Container boxes, file I/O, memory mapping: the caller supplies the
//!   entire codestream as one contiguous slice
//!
//! ## Usage
//!
//! ```no_run
//! use zenjxl::{DecodeRequest, DecodeResult, Override};
//! # fn run(codec: &mut impl zenjxl::FrameCodec, data: &[u8]) -> Result<(), zenjxl::JxlError> {
//! // Decode, keeping partial output if the stream turns out truncated.
//! let mut result = DecodeResult::default();
//! let status = DecodeRequest::new(data)
//!     .preview(Override::Default)
//!     .allow_partial_files(true)
//!     .decode_into(codec, None, &mut result);
//! println!("{} frames, {} pixels", result.frames.len(), result.decoded_pixels);
//! status
//! # }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod bits;
mod decode;
mod error;
mod frame;
mod headers;
mod icc;
mod legacy;
mod limits;

// Re-exports
pub use bits::{BitReader, U32Spec, read_u32, read_u64};
pub use decode::{DecodeOptions, DecodeRequest, DecodeResult, Override};
pub use error::JxlError;
pub use frame::{
    ColorTransformFn, Frame, FrameCodec, FrameDecodeState, FrameHeader, FrameType, WorkerPool,
};
pub use headers::{
    AnimationHeader, ColorEncoding, ColorSpace, ImageMetadata, ImageSize, TransformData,
};
pub use legacy::{AppMarker, ICC_MARKER_HEADER_LEN, LegacyPayload, MarkerKind};
pub use limits::Limits;
