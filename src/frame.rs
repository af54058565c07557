//! Frame types and the collaborator seams the orchestrator drives:
//! per-frame pixel decoding, colorspace transforms, and worker pools.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::bits::BitReader;
use crate::decode::DecodeOptions;
use crate::error::JxlError;
use crate::headers::{ColorEncoding, ImageMetadata};
use crate::legacy::LegacyPayload;

/// How a decoded frame participates in the output sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum FrameType {
    /// A displayed frame contributing to the visible sequence.
    #[default]
    Regular,
    /// Decoded in place of later progressive passes; counts as displayed.
    SkipProgressive,
    /// Stored only for later frames to reference; not displayed.
    ReferenceOnly,
    /// Downsampled DC data for a later frame; not displayed.
    DcFrame,
}

impl FrameType {
    /// Whether a frame of this type ends the inner skip loop and is
    /// counted as sequence output.
    pub fn is_displayed(self) -> bool {
        matches!(self, FrameType::Regular | FrameType::SkipProgressive)
    }
}

/// Per-frame control data produced by the frame-decode collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameHeader {
    pub frame_type: FrameType,
    /// Set on the final frame of the sequence.
    pub is_last: bool,
}

/// One element of the decoded sequence. The pixel buffer is filled by the
/// frame-decode collaborator; this crate only routes it.
#[derive(Debug, Default)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    /// Samples per pixel in `pixels`.
    pub channels: u32,
    /// Interleaved samples, `width * height * channels` long.
    pub pixels: Vec<f32>,
    /// Reconstruction side-data; present on the first frame when the
    /// caller asked to keep it.
    pub legacy_payload: Option<LegacyPayload>,
}

impl Frame {
    /// Typed view of the pixels as `Rgb<f32>`, if the frame has three
    /// channels.
    #[cfg(feature = "rgb")]
    pub fn as_rgb(&self) -> Option<&[rgb::Rgb<f32>]> {
        use rgb::FromSlice as _;
        (self.channels == 3).then(|| self.pixels.as_rgb())
    }

    /// Zero-copy 2D view of the pixels, if the frame has three channels.
    #[cfg(feature = "imgref")]
    pub fn as_imgref(&self) -> Option<imgref::ImgRef<'_, rgb::Rgb<f32>>> {
        let pixels = self.as_rgb()?;
        Some(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// Colorspace-transform hook installed into [`FrameDecodeState`]; invoked
/// by the frame-decode collaborator, never by the orchestrator.
pub type ColorTransformFn =
    Box<dyn FnMut(&mut Frame, &ColorEncoding, Option<&dyn WorkerPool>) -> Result<(), JxlError>>;

/// Capability to parallelize work. Implementations wrap an existing
/// thread pool; the orchestrator never creates one and only forwards it
/// to collaborators.
pub trait WorkerPool: Sync {
    /// Run `task` for every index in `0..n`, possibly on multiple threads.
    fn run(&self, n: usize, task: &(dyn Fn(usize) + Sync));
}

/// Mutable state threaded through successive frame decodes within one
/// decode call. Created fresh for the preview and again for the main
/// sequence; reused across iterations of the frame loop.
#[derive(Default)]
pub struct FrameDecodeState {
    /// Header of the most recently decoded frame.
    pub frame_header: FrameHeader,
    /// Dimensions after upsampling, used for the decoded-pixel counter
    /// when the frame itself is not kept (preview).
    pub upsampled_width: u32,
    pub upsampled_height: u32,
    pub color_transform: Option<ColorTransformFn>,
}

/// Per-frame pixel decoding, consumed as an opaque collaborator.
///
/// `decode_frame` must consume the frame's entire encoded extent from
/// `reader`, fill `frame`, and record the frame's header in
/// `state.frame_header`. `skip_frame` must advance `reader` past one
/// frame without producing pixels.
pub trait FrameCodec {
    fn decode_frame(
        &mut self,
        options: &DecodeOptions,
        state: &mut FrameDecodeState,
        reader: &mut BitReader<'_>,
        metadata: &ImageMetadata,
        frame: &mut Frame,
        pool: Option<&dyn WorkerPool>,
        is_preview: bool,
    ) -> Result<(), JxlError>;

    fn skip_frame(
        &mut self,
        metadata: &ImageMetadata,
        reader: &mut BitReader<'_>,
        is_preview: bool,
    ) -> Result<(), JxlError>;
}
