#![no_main]
use libfuzzer_sys::fuzz_target;
use trk_seeds::TrkHeader;

fuzz_target!(|data: &[u8]| {
    if let Ok(header) = TrkHeader::from_reader(data) {
        let _ = header.version();
        let _ = header.voxel_order();
        let _ = header.scalar_layout();
        let _ = header.property_layout();
        let _ = trk_seeds::affine::trackvis_to_rasmm(&header);
    }
});
