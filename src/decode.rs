//! Top-level codestream decode: headers, ICC reconciliation, preview,
//! frame sequencing, and terminal-position validation, all over one
//! shared bit cursor.
//!
//! The whole input must already be addressable as a contiguous byte
//! slice; mapping large files into memory is the caller's responsibility.

use alloc::vec::Vec;

use crate::bits::BitReader;
use crate::error::JxlError;
use crate::frame::{ColorTransformFn, Frame, FrameCodec, FrameDecodeState, WorkerPool};
use crate::headers::{ImageMetadata, ImageSize, TransformData};
use crate::icc::{read_icc, reconcile_legacy_icc};
use crate::legacy::LegacyPayload;
use crate::limits::Limits;

/// Two-byte codestream signature preceding all headers.
const SIGNATURE: [u8; 2] = [0xFF, 0x0A];

/// Tri-state override for behavior that otherwise follows the bitstream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Override {
    On,
    Off,
    #[default]
    Default,
}

/// User-requested decode behavior, supplied once per decode.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Force preview decoding on or off; `Default` decodes a preview iff
    /// one is present.
    pub preview: Override,
    /// Carry the caller-supplied legacy reconstruction payload on the
    /// first frame.
    pub keep_legacy_payload: bool,
    /// Require the cursor to land exactly at end of input.
    pub check_decompressed_size: bool,
    /// Tolerate reads past the end of truncated files.
    pub allow_partial_files: bool,
    /// Requested downsampling factor; collaborators decoding at a lower
    /// resolution consume fewer bits, so exact-size checking only applies
    /// at 1.
    pub max_downsampling: u32,
    pub limits: Limits,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            preview: Override::Default,
            keep_legacy_payload: false,
            check_decompressed_size: true,
            allow_partial_files: false,
            max_downsampling: 1,
            limits: Limits::default(),
        }
    }
}

/// Decoded output: global metadata, optional preview, and the displayed
/// frame sequence. Filled incrementally; on failure, frames decoded so
/// far remain present.
#[derive(Debug, Default)]
pub struct DecodeResult {
    pub metadata: ImageMetadata,
    pub preview: Option<Frame>,
    pub frames: Vec<Frame>,
    /// Running count of decoded pixels across displayed frames (and the
    /// preview, when decoded).
    pub decoded_pixels: u64,
}

/// A single decode of one codestream.
///
/// ```no_run
/// use zenjxl::{DecodeRequest, Override};
/// # fn run(codec: &mut impl zenjxl::FrameCodec) -> Result<(), zenjxl::JxlError> {
/// let data: &[u8] = &[];
/// let result = DecodeRequest::new(data)
///     .preview(Override::Off)
///     .decode(codec, None)?;
/// println!("{} frames", result.frames.len());
/// # Ok(())
/// # }
/// ```
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    options: DecodeOptions,
    legacy_payload: Option<LegacyPayload>,
    color_transform: Option<ColorTransformFn>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            options: DecodeOptions::default(),
            legacy_payload: None,
            color_transform: None,
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn preview(mut self, preview: Override) -> Self {
        self.options.preview = preview;
        self
    }

    /// Request that `payload` be carried on the first decoded frame.
    pub fn keep_legacy_payload(mut self, payload: LegacyPayload) -> Self {
        self.options.keep_legacy_payload = true;
        self.legacy_payload = Some(payload);
        self
    }

    pub fn check_decompressed_size(mut self, check: bool) -> Self {
        self.options.check_decompressed_size = check;
        self
    }

    pub fn allow_partial_files(mut self, allow: bool) -> Self {
        self.options.allow_partial_files = allow;
        self
    }

    pub fn max_downsampling(mut self, factor: u32) -> Self {
        self.options.max_downsampling = factor;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Install the colorspace-transform hook handed to the frame codec
    /// for the main frame sequence.
    pub fn color_transform(mut self, transform: ColorTransformFn) -> Self {
        self.color_transform = Some(transform);
        self
    }

    /// Decode into a caller-owned result, which keeps whatever partial
    /// output accumulated if decoding fails.
    pub fn decode_into(
        self,
        codec: &mut dyn FrameCodec,
        pool: Option<&dyn WorkerPool>,
        out: &mut DecodeResult,
    ) -> Result<(), JxlError> {
        let DecodeRequest {
            data,
            options,
            legacy_payload,
            color_transform,
        } = self;

        if data.len() < 2 || data[..2] != SIGNATURE {
            return Err(JxlError::BadSignature);
        }
        let legacy = if options.keep_legacy_payload {
            Some(legacy_payload.ok_or(JxlError::ContractViolation(
                "keep_legacy_payload set but no payload supplied",
            ))?)
        } else {
            // An unsolicited payload is ignored.
            None
        };

        let mut reader = BitReader::new(data);
        let status = decode_body(
            &options,
            &mut reader,
            codec,
            pool,
            legacy,
            color_transform,
            out,
        );
        // The cursor's bound-violation state is delivered exactly once, on
        // every exit path, unless partial files are tolerated.
        let closed = reader.close();
        if options.allow_partial_files {
            status
        } else {
            status.and(closed)
        }
    }

    /// Decode, returning the result by value. The partial result is
    /// dropped on failure; use [`DecodeRequest::decode_into`] to keep it.
    pub fn decode(
        self,
        codec: &mut dyn FrameCodec,
        pool: Option<&dyn WorkerPool>,
    ) -> Result<DecodeResult, JxlError> {
        let mut out = DecodeResult::default();
        self.decode_into(codec, pool, &mut out)?;
        Ok(out)
    }
}

fn decode_body(
    options: &DecodeOptions,
    reader: &mut BitReader<'_>,
    codec: &mut dyn FrameCodec,
    pool: Option<&dyn WorkerPool>,
    mut legacy: Option<LegacyPayload>,
    color_transform: Option<ColorTransformFn>,
    out: &mut DecodeResult,
) -> Result<(), JxlError> {
    // Signature already validated; skip the marker.
    let _ = reader.read_bits(16);

    out.metadata = decode_headers(reader)?;
    let ImageSize { width, height } = out.metadata.size;
    options.limits.check(width, height)?;

    if out.metadata.color_encoding.want_icc {
        reader.align_to_byte();
        out.metadata.color_encoding.icc = read_icc(reader)?;
    }
    if let Some(payload) = legacy.as_mut() {
        reconcile_legacy_icc(payload, &out.metadata.color_encoding.icc)?;
    }

    decode_preview(options, reader, codec, pool, out)?;

    // Only moves the cursor if neither ICC nor preview was present.
    reader.align_to_byte();

    decode_frames(options, reader, codec, pool, legacy, color_transform, out)?;

    if options.check_decompressed_size
        && !options.allow_partial_files
        && options.max_downsampling == 1
        && reader.consumed_bits() != reader.total_bits()
    {
        return Err(JxlError::TrailingOrMissingData {
            consumed_bits: reader.consumed_bits(),
            total_bits: reader.total_bits(),
        });
    }
    Ok(())
}

/// Parse size, general metadata, and transform metadata. The transform
/// block's layout branches on the XYB-encoded flag carried over from the
/// metadata block.
fn decode_headers(reader: &mut BitReader<'_>) -> Result<ImageMetadata, JxlError> {
    let size = ImageSize::read(reader)?;
    let mut metadata = ImageMetadata::read(reader)?;
    metadata.size = size;
    metadata.transform = TransformData::read(reader, metadata.xyb_encoded);
    Ok(metadata)
}

fn decode_preview(
    options: &DecodeOptions,
    reader: &mut BitReader<'_>,
    codec: &mut dyn FrameCodec,
    pool: Option<&dyn WorkerPool>,
    out: &mut DecodeResult,
) -> Result<(), JxlError> {
    if !out.metadata.have_preview() {
        if options.preview == Override::On {
            return Err(JxlError::PreviewRequestedButAbsent);
        }
        return Ok(());
    }

    reader.align_to_byte();

    if options.preview == Override::Off {
        return codec.skip_frame(&out.metadata, reader, true);
    }

    let mut state = FrameDecodeState::default();
    let mut preview = Frame::default();
    codec.decode_frame(
        options,
        &mut state,
        reader,
        &out.metadata,
        &mut preview,
        pool,
        true,
    )?;
    out.decoded_pixels += u64::from(state.upsampled_width) * u64::from(state.upsampled_height);
    out.preview = Some(preview);
    Ok(())
}

/// The frame loop: append an empty frame, decode into it (replacing
/// non-displayed frames in place), count its pixels, and stop after the
/// frame flagged last.
fn decode_frames(
    options: &DecodeOptions,
    reader: &mut BitReader<'_>,
    codec: &mut dyn FrameCodec,
    pool: Option<&dyn WorkerPool>,
    mut legacy: Option<LegacyPayload>,
    color_transform: Option<ColorTransformFn>,
    out: &mut DecodeResult,
) -> Result<(), JxlError> {
    if out.metadata.have_animation() && options.keep_legacy_payload {
        return Err(JxlError::AnimationIncompatibleWithLegacyPayload);
    }

    let mut state = FrameDecodeState {
        color_transform,
        ..FrameDecodeState::default()
    };

    out.frames.clear();
    loop {
        out.frames.push(Frame {
            legacy_payload: legacy.take(),
            ..Frame::default()
        });
        let slot = out.frames.len() - 1;

        // Reference-only and DC frames are consumed from the stream but
        // replaced in the same slot, not appended.
        loop {
            codec.decode_frame(
                options,
                &mut state,
                reader,
                &out.metadata,
                &mut out.frames[slot],
                pool,
                false,
            )?;
            if state.frame_header.frame_type.is_displayed() {
                break;
            }
        }

        let displayed = &out.frames[slot];
        out.decoded_pixels += u64::from(displayed.width) * u64::from(displayed.height);

        if state.frame_header.is_last {
            return Ok(());
        }
    }
}
