//! Embedded ICC profile: extraction from the codestream and
//! redistribution into a legacy reconstruction payload.
//!
//! Semantic validation of the profile bytes is out of scope; this module
//! only establishes how many bytes the profile occupies and where they
//! are routed.

use alloc::vec::Vec;

use crate::bits::{BitReader, read_u64};
use crate::error::JxlError;
use crate::legacy::{ICC_MARKER_HEADER_LEN, LegacyPayload, MarkerKind};

/// Read the ICC section: a `U64` declared length followed by that many
/// profile bytes. The section starts byte-aligned but the length field
/// leaves the cursor mid-byte, so the bytes are read bit-granular.
///
/// A declared length beyond the remaining input fails immediately rather
/// than zero-filling, so a hostile length cannot drive the allocation.
pub(crate) fn read_icc(reader: &mut BitReader<'_>) -> Result<Vec<u8>, JxlError> {
    let declared = read_u64(reader);
    let remaining_bits = reader.total_bits().saturating_sub(reader.consumed_bits());
    if declared > remaining_bits / 8 {
        return Err(JxlError::UnexpectedEof);
    }
    let mut icc = Vec::with_capacity(declared as usize);
    for _ in 0..declared {
        icc.push(reader.read_bits(8) as u8);
    }
    Ok(icc)
}

/// Distribute decoded profile bytes across the payload's ICC-tagged app
/// markers, in payload order. Each marker receives a contiguous slice at
/// offset [`ICC_MARKER_HEADER_LEN`]; the ranges are disjoint, tracked by
/// a running offset.
///
/// An entirely unconsumed profile (`icc_pos == 0`, no ICC markers in the
/// payload) is tolerated: the profile then lives only in the metadata.
pub(crate) fn reconcile_legacy_icc(
    payload: &mut LegacyPayload,
    icc: &[u8],
) -> Result<(), JxlError> {
    let mut icc_pos = 0usize;
    for marker in &mut payload.app_markers {
        if marker.kind != MarkerKind::Icc {
            continue;
        }
        let len = marker
            .data
            .len()
            .checked_sub(ICC_MARKER_HEADER_LEN)
            .ok_or(JxlError::ContractViolation(
                "ICC app marker shorter than its 17-byte header",
            ))?;
        let available = icc.len() - icc_pos;
        if len > available {
            return Err(JxlError::IccUnderrun {
                requested: len,
                available,
            });
        }
        marker.data[ICC_MARKER_HEADER_LEN..].copy_from_slice(&icc[icc_pos..icc_pos + len]);
        icc_pos += len;
    }
    if icc_pos != icc.len() && icc_pos != 0 {
        return Err(JxlError::IccOverrun {
            leftover: icc.len() - icc_pos,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::legacy::AppMarker;
    use alloc::vec;

    fn icc_marker(payload_len: usize) -> AppMarker {
        AppMarker {
            kind: MarkerKind::Icc,
            data: vec![0u8; ICC_MARKER_HEADER_LEN + payload_len],
        }
    }

    #[test]
    fn exact_profile_fills_markers_in_order() {
        let mut payload = LegacyPayload {
            app_markers: vec![
                icc_marker(3),
                AppMarker {
                    kind: MarkerKind::Exif,
                    data: vec![0xEE; 4],
                },
                icc_marker(2),
            ],
        };
        let icc = [1, 2, 3, 4, 5];
        reconcile_legacy_icc(&mut payload, &icc).unwrap();
        assert_eq!(&payload.app_markers[0].data[ICC_MARKER_HEADER_LEN..], &[
            1, 2, 3
        ]);
        assert_eq!(&payload.app_markers[2].data[ICC_MARKER_HEADER_LEN..], &[
            4, 5
        ]);
        // Non-ICC markers are untouched.
        assert_eq!(payload.app_markers[1].data, vec![0xEE; 4]);
    }

    #[test]
    fn short_profile_is_underrun() {
        let mut payload = LegacyPayload {
            app_markers: vec![icc_marker(3), icc_marker(2)],
        };
        let icc = [1, 2, 3, 4]; // one byte short
        let err = reconcile_legacy_icc(&mut payload, &icc).unwrap_err();
        assert!(matches!(err, JxlError::IccUnderrun {
            requested: 2,
            available: 1
        }));
    }

    #[test]
    fn long_profile_is_overrun() {
        let mut payload = LegacyPayload {
            app_markers: vec![icc_marker(5)],
        };
        let icc = [0u8; 6]; // one byte over
        let err = reconcile_legacy_icc(&mut payload, &icc).unwrap_err();
        assert!(matches!(err, JxlError::IccOverrun { leftover: 1 }));
    }

    #[test]
    fn unconsumed_profile_without_icc_markers_is_tolerated() {
        let mut payload = LegacyPayload {
            app_markers: vec![AppMarker {
                kind: MarkerKind::Xmp,
                data: vec![0; 8],
            }],
        };
        let icc = [1, 2, 3];
        reconcile_legacy_icc(&mut payload, &icc).unwrap();
    }

    #[test]
    fn truncated_marker_is_contract_violation() {
        let mut payload = LegacyPayload {
            app_markers: vec![AppMarker {
                kind: MarkerKind::Icc,
                data: vec![0; ICC_MARKER_HEADER_LEN - 1],
            }],
        };
        let err = reconcile_legacy_icc(&mut payload, &[]).unwrap_err();
        assert!(matches!(err, JxlError::ContractViolation(_)));
    }

    #[test]
    fn read_icc_rejects_length_past_input() {
        // U64 selector 2 -> u(8) + 17; payload 0xFF declares 272 bytes of
        // profile in a 2-byte stream.
        let data = [0b1111_1110, 0b0000_0011];
        let mut reader = BitReader::new(&data);
        assert!(matches!(read_icc(&mut reader), Err(JxlError::UnexpectedEof)));
    }

    #[test]
    fn read_icc_reads_declared_bytes() {
        // U64 selector 1 (bits 1,0), 4-bit payload 2 -> length 3, then the
        // profile bytes bit-packed immediately after.
        let mut bits: Vec<u8> = Vec::new();
        let mut push = |value: u64, n: u32| {
            for i in 0..n {
                bits.push(((value >> i) & 1) as u8);
            }
        };
        push(1, 2);
        push(2, 4);
        for byte in [0xAAu64, 0xBB, 0xCC] {
            push(byte, 8);
        }
        let mut data = vec![0u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.iter().enumerate() {
            data[i / 8] |= bit << (i % 8);
        }
        let mut reader = BitReader::new(&data);
        assert_eq!(read_icc(&mut reader).unwrap(), vec![0xAA, 0xBB, 0xCC]);
    }
}
