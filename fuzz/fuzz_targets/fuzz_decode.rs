#![no_main]
use libfuzzer_sys::fuzz_target;
use zenjxl::{
    DecodeOptions, DecodeRequest, FrameCodec, FrameDecodeState, FrameHeader, FrameType, JxlError,
};

/// Minimal codec: one header byte, one length byte, that many payload
/// bytes. Treats truncation as the final frame so arbitrary input always
/// terminates.
struct FuzzCodec;

impl FrameCodec for FuzzCodec {
    fn decode_frame(
        &mut self,
        _options: &DecodeOptions,
        state: &mut FrameDecodeState,
        reader: &mut zenjxl::BitReader<'_>,
        _metadata: &zenjxl::ImageMetadata,
        _frame: &mut zenjxl::Frame,
        _pool: Option<&dyn zenjxl::WorkerPool>,
        _is_preview: bool,
    ) -> Result<(), JxlError> {
        let header = reader.read_bits(8) as u8;
        let payload_len = reader.read_bits(8);
        reader.skip_bits(8 * payload_len);
        state.frame_header = FrameHeader {
            frame_type: if header & 1 == 0 {
                FrameType::Regular
            } else {
                FrameType::ReferenceOnly
            },
            is_last: header & 0x80 != 0 || !reader.all_reads_within_bounds(),
        };
        Ok(())
    }

    fn skip_frame(
        &mut self,
        _metadata: &zenjxl::ImageMetadata,
        reader: &mut zenjxl::BitReader<'_>,
        _is_preview: bool,
    ) -> Result<(), JxlError> {
        let _ = reader.read_bits(8);
        let payload_len = reader.read_bits(8);
        reader.skip_bits(8 * payload_len);
        Ok(())
    }
}

fuzz_target!(|data: &[u8]| {
    // Must never panic, whatever the input.
    let _ = DecodeRequest::new(data).decode(&mut FuzzCodec, None);
    let _ = DecodeRequest::new(data)
        .allow_partial_files(true)
        .decode(&mut FuzzCodec, None);
});
