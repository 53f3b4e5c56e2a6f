#![no_main]
use libfuzzer_sys::fuzz_target;
use trk_seeds::seeds::seeded_tractogram;
use trk_seeds::ReaderOptions;

fuzz_target!(|data: &[u8]| {
    if let Ok(trk) = ReaderOptions::new().read(data) {
        let _ = seeded_tractogram(trk.into_tractogram());
    }
});
