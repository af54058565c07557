//! Codestream headers: size, image metadata, and transform metadata.
//!
//! Layout follows the JPEG XL conventions: `U32` fields pick one of four
//! distributions with a 2-bit selector, dimensions are encoded either as
//! a multiple of 8 ("small") or with a wide `U32`, and optional blocks
//! collapse to a single `all_default` bit in the common case.

use alloc::vec::Vec;

use crate::bits::{BitReader, U32Spec, read_u32};
use crate::error::JxlError;

// ── Size header ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

/// Aspect ratios selectable by the 3-bit `ratio` field, `num:den`.
const RATIOS: [(u32, u32); 7] = [
    (1, 1),
    (12, 10),
    (4, 3),
    (3, 2),
    (16, 9),
    (5, 4),
    (2, 1),
];

fn read_dimension(reader: &mut BitReader<'_>) -> u32 {
    let small = reader.read_bits(1) == 1;
    if small {
        8 * (reader.read_bits(5) as u32 + 1)
    } else {
        read_u32(
            reader,
            [
                U32Spec::Bits(9),
                U32Spec::Bits(13),
                U32Spec::Bits(18),
                U32Spec::Bits(30),
            ],
        ) + 1
    }
}

impl ImageSize {
    /// Read a size header: height first, then either a ratio-derived or an
    /// explicitly coded width.
    pub(crate) fn read(reader: &mut BitReader<'_>) -> Result<Self, JxlError> {
        let height = read_dimension(reader);
        let ratio = reader.read_bits(3) as usize;
        let width = if ratio == 0 {
            read_dimension(reader)
        } else {
            let (num, den) = RATIOS[ratio - 1];
            let wide = u64::from(height) * u64::from(num) / u64::from(den);
            u32::try_from(wide).map_err(|_| JxlError::MalformedHeader("ratio width overflow"))?
        };
        if width == 0 || height == 0 {
            return Err(JxlError::MalformedHeader("zero image dimension"));
        }
        Ok(Self { width, height })
    }
}

// ── Color encoding ──────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    #[default]
    Rgb,
    Gray,
    Xyb,
    Unknown,
}

/// How decoded samples are to be interpreted: either an enumerated
/// colorspace or an embedded ICC profile installed after header decode.
#[derive(Clone, Debug, Default)]
pub struct ColorEncoding {
    pub want_icc: bool,
    pub colorspace: ColorSpace,
    /// Decoded profile bytes; empty until the ICC section is read.
    pub icc: Vec<u8>,
}

impl ColorEncoding {
    fn read(reader: &mut BitReader<'_>) -> Self {
        let want_icc = reader.read_bits(1) == 1;
        let colorspace = if want_icc {
            ColorSpace::Unknown
        } else {
            match reader.read_bits(2) {
                0 => ColorSpace::Rgb,
                1 => ColorSpace::Gray,
                2 => ColorSpace::Xyb,
                _ => ColorSpace::Unknown,
            }
        };
        Self {
            want_icc,
            colorspace,
            icc: Vec::new(),
        }
    }
}

// ── Animation header ────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationHeader {
    /// Ticks per second as a rational, `numerator / denominator`.
    pub tps_numerator: u32,
    pub tps_denominator: u32,
    /// 0 means loop forever.
    pub num_loops: u32,
    pub have_timecodes: bool,
}

impl AnimationHeader {
    fn read(reader: &mut BitReader<'_>) -> Result<Self, JxlError> {
        let tps_numerator = read_u32(
            reader,
            [
                U32Spec::Val(100),
                U32Spec::Val(1000),
                U32Spec::BitsOffset {
                    bits: 10,
                    offset: 1,
                },
                U32Spec::BitsOffset {
                    bits: 30,
                    offset: 1,
                },
            ],
        );
        let tps_denominator = read_u32(
            reader,
            [
                U32Spec::Val(1),
                U32Spec::Val(1001),
                U32Spec::BitsOffset { bits: 8, offset: 1 },
                U32Spec::BitsOffset {
                    bits: 10,
                    offset: 1,
                },
            ],
        );
        let num_loops = read_u32(
            reader,
            [
                U32Spec::Val(0),
                U32Spec::Bits(3),
                U32Spec::Bits(16),
                U32Spec::Bits(32),
            ],
        );
        let have_timecodes = reader.read_bits(1) == 1;
        if tps_numerator == 0 {
            return Err(JxlError::MalformedHeader("zero animation tick rate"));
        }
        Ok(Self {
            tps_numerator,
            tps_denominator,
            num_loops,
            have_timecodes,
        })
    }
}

// ── Image metadata ──────────────────────────────────────────────────

/// Global image description, fully populated before any frame decode.
#[derive(Clone, Debug)]
pub struct ImageMetadata {
    pub size: ImageSize,
    pub bits_per_sample: u32,
    /// Selects the color-transform convention of the transform block.
    pub xyb_encoded: bool,
    pub color_encoding: ColorEncoding,
    /// Declared preview dimensions, when a preview frame is present.
    pub preview_size: Option<ImageSize>,
    pub animation: Option<AnimationHeader>,
    pub transform: TransformData,
}

impl Default for ImageMetadata {
    fn default() -> Self {
        Self {
            size: ImageSize::default(),
            bits_per_sample: 8,
            xyb_encoded: true,
            color_encoding: ColorEncoding::default(),
            preview_size: None,
            animation: None,
            transform: TransformData::default(),
        }
    }
}

impl ImageMetadata {
    pub fn have_preview(&self) -> bool {
        self.preview_size.is_some()
    }

    pub fn have_animation(&self) -> bool {
        self.animation.is_some()
    }

    /// Read the general metadata block. `self.size` is filled by the
    /// caller from the size header; `self.transform` by the transform
    /// block that follows.
    pub(crate) fn read(reader: &mut BitReader<'_>) -> Result<Self, JxlError> {
        let mut metadata = Self::default();
        let all_default = reader.read_bits(1) == 1;
        if all_default {
            return Ok(metadata);
        }

        let have_preview = reader.read_bits(1) == 1;
        let have_animation = reader.read_bits(1) == 1;
        metadata.bits_per_sample = read_u32(
            reader,
            [
                U32Spec::Val(8),
                U32Spec::Val(10),
                U32Spec::Val(12),
                U32Spec::BitsOffset { bits: 6, offset: 1 },
            ],
        );
        if metadata.bits_per_sample > 31 {
            return Err(JxlError::MalformedHeader("sample depth too large"));
        }
        metadata.xyb_encoded = reader.read_bits(1) == 1;
        metadata.color_encoding = ColorEncoding::read(reader);
        if have_preview {
            metadata.preview_size = Some(ImageSize::read(reader)?);
        }
        if have_animation {
            metadata.animation = Some(AnimationHeader::read(reader)?);
        }
        Ok(metadata)
    }
}

// ── Transform metadata ──────────────────────────────────────────────

/// Opsin matrix and upsampling weight overrides. All fields default to
/// the built-in tables; the raw 16-bit words are half-float bit patterns
/// interpreted by the pixel-decode collaborator.
#[derive(Clone, Debug, Default)]
pub struct TransformData {
    pub opsin_inverse: Option<[u16; 9]>,
    pub up2_weights: Option<Vec<u16>>,
    pub up4_weights: Option<Vec<u16>>,
    pub up8_weights: Option<Vec<u16>>,
}

fn read_weight_words(reader: &mut BitReader<'_>, count: usize) -> Vec<u16> {
    let mut words = Vec::with_capacity(count);
    for _ in 0..count {
        words.push(reader.read_bits(16) as u16);
    }
    words
}

impl TransformData {
    /// Read the transform block. Its layout branches on the XYB-encoded
    /// flag carried over from the general metadata block.
    pub(crate) fn read(reader: &mut BitReader<'_>, xyb_encoded: bool) -> Self {
        let mut transform = Self::default();
        let all_default = reader.read_bits(1) == 1;
        if all_default {
            return transform;
        }

        if xyb_encoded && reader.read_bits(1) == 1 {
            let mut matrix = [0u16; 9];
            for word in &mut matrix {
                *word = reader.read_bits(16) as u16;
            }
            transform.opsin_inverse = Some(matrix);
        }
        let custom_weights_mask = reader.read_bits(3);
        if custom_weights_mask & 1 != 0 {
            transform.up2_weights = Some(read_weight_words(reader, 15));
        }
        if custom_weights_mask & 2 != 0 {
            transform.up4_weights = Some(read_weight_words(reader, 55));
        }
        if custom_weights_mask & 4 != 0 {
            transform.up8_weights = Some(read_weight_words(reader, 210));
        }
        transform
    }
}
