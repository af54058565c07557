use crate::error::JxlError;

/// Dimension limits applied after the size header is decoded.
///
/// Defaults match the decoder-wide caps: 262 144 on each axis and 2^28
/// total pixels. Failing a check is fatal; partial-file tolerance never
/// applies to it.
#[derive(Clone, Debug)]
pub struct Limits {
    pub max_width: u64,
    pub max_height: u64,
    /// Maximum pixel count (width * height).
    pub max_pixels: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_width: 1 << 18,
            max_height: 1 << 18,
            max_pixels: 1 << 28,
        }
    }
}

impl Limits {
    pub(crate) fn check(&self, width: u32, height: u32) -> Result<(), JxlError> {
        if u64::from(width) > self.max_width
            || u64::from(height) > self.max_height
            || u64::from(width) * u64::from(height) > self.max_pixels
        {
            return Err(JxlError::DimensionLimitExceeded { width, height });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_accept_common_sizes() {
        let limits = Limits::default();
        assert!(limits.check(1920, 1080).is_ok());
        assert!(limits.check(16384, 16384).is_ok());
    }

    #[test]
    fn pixel_count_cap_rejects_huge_images() {
        let limits = Limits::default();
        let err = limits.check(262_144, 262_144).unwrap_err();
        assert!(matches!(err, JxlError::DimensionLimitExceeded { .. }));
    }

    #[test]
    fn axis_cap_rejects_oversized_dimension() {
        let limits = Limits {
            max_width: 100,
            max_height: 100,
            max_pixels: u64::MAX,
        };
        assert!(limits.check(101, 1).is_err());
        assert!(limits.check(1, 101).is_err());
    }
}
