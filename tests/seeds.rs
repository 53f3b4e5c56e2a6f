extern crate trk_seeds;
#[macro_use]
extern crate pretty_assertions;

mod util;

use std::fs;

use tempfile::tempdir;
use trk_seeds::{
    extract_seeds_and_streamlines, ContainerFormat, SeedError, Streamline, Tractogram, TrkError,
};

use util::{seeded_tractogram, streamlines, write_fixture};

#[test]
fn streamlines_and_seeds_are_aligned() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[10, 5, 8]));

    let seeded = extract_seeds_and_streamlines(&path).unwrap();
    assert_eq!(seeded.len(), 3);
    assert_eq!(seeded.streamlines().len(), 3);
    assert_eq!(seeded.seed_points().len(), 3);

    let lengths: Vec<usize> = seeded.streamlines().iter().map(Streamline::len).collect();
    assert_eq!(lengths, vec![10, 5, 8]);
    for (i, (_, seeds)) in seeded.iter().enumerate() {
        // seeds are returned as recorded, one point per streamline
        assert_eq!(seeds, &[[1., i as f32, 2.]]);
    }
}

#[test]
fn many_streamlines_keep_their_order() {
    let lengths: Vec<usize> = (1..=50).collect();
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "many.trk.gz", &seeded_tractogram(&lengths));

    let seeded = extract_seeds_and_streamlines(&path).unwrap();
    assert_eq!(seeded.len(), 50);
    for (i, (streamline, seeds)) in seeded.iter().enumerate() {
        assert_eq!(streamline.len(), i + 1);
        assert_eq!(seeds[0][1], i as f32);
    }
}

#[test]
fn extraction_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[4, 7]));

    let first = extract_seeds_and_streamlines(&path).unwrap();
    let second = extract_seeds_and_streamlines(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn empty_seeds_are_not_missing() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "empty.trk", &seeded_tractogram(&[]));

    let seeded = extract_seeds_and_streamlines(&path).unwrap();
    assert!(seeded.is_empty());
    assert!(seeded.streamlines().is_empty());
    assert!(seeded.seed_points().is_empty());
}

#[test]
fn missing_seeds() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "unseeded.trk",
        &Tractogram::new(streamlines(&[3, 3])),
    );

    let err = extract_seeds_and_streamlines(&path).unwrap_err();
    assert!(matches!(err, SeedError::MissingAttribute(ref key) if key == "seeds"));
    assert_eq!(err.to_string(), "Tractogram does not contain seeds");
}

#[test]
fn other_formats_are_rejected_before_parsing() {
    let dir = tempdir().unwrap();

    // an MRtrix header followed by garbage, hiding behind a .trk name
    let disguised = dir.path().join("disguised.trk");
    fs::write(&disguised, b"mrtrix tracks\n\x01\x02garbage").unwrap();
    let err = extract_seeds_and_streamlines(&disguised).unwrap_err();
    match err {
        SeedError::UnsupportedFormat(path, format) => {
            assert_eq!(path, disguised);
            assert_eq!(format, ContainerFormat::Tck);
        }
        e => panic!("unexpected error: {}", e),
    }

    let tck = dir.path().join("tracks.tck");
    fs::write(&tck, b"\x00\x01\x02corrupt").unwrap();
    let err = extract_seeds_and_streamlines(&tck).unwrap_err();
    assert!(matches!(err, SeedError::UnsupportedFormat(_, ContainerFormat::Tck)));
    assert!(err.to_string().contains("must be trk"));

    let unknown = dir.path().join("tracks.bin");
    fs::write(&unknown, b"").unwrap();
    let err = extract_seeds_and_streamlines(&unknown).unwrap_err();
    assert!(matches!(err, SeedError::UnsupportedFormat(_, ContainerFormat::Unknown)));
}

#[test]
fn stale_property_names_are_ignored() {
    let dir = tempdir().unwrap();
    let path = write_fixture(
        dir.path(),
        "unseeded.trk",
        &Tractogram::new(streamlines(&[3, 2])),
    );
    let mut bytes = fs::read(&path).unwrap();

    // first property name slot, while the header counts no properties
    for slot in &[&b"seeds\x003\x00"[..], &b"ab\x00junk\x00"[..]] {
        bytes[240..248].copy_from_slice(slot);
        fs::write(&path, &bytes).unwrap();
        let err = extract_seeds_and_streamlines(&path).unwrap_err();
        assert!(
            matches!(err, SeedError::MissingAttribute(ref key) if key == "seeds"),
            "{}",
            err
        );
    }
}

#[test]
fn trk_extension_without_magic_is_parsed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("x.trk");
    let mut bytes = b"garbage".to_vec();
    bytes.resize(1000, b'?');
    fs::write(&path, &bytes).unwrap();

    let err = extract_seeds_and_streamlines(&path).unwrap_err();
    assert!(matches!(err, SeedError::Load(_, TrkError::InvalidMagic(m)) if &m == b"garbag"));
}

#[test]
fn corrupt_trk_is_a_load_error() {
    let dir = tempdir().unwrap();
    let path = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[10, 5, 8]));
    let bytes = fs::read(&path).unwrap();

    let truncated = dir.path().join("truncated.trk");
    fs::write(&truncated, &bytes[..bytes.len() - 6]).unwrap();
    let err = extract_seeds_and_streamlines(&truncated).unwrap_err();
    assert!(matches!(err, SeedError::Load(_, TrkError::Truncated(2))));

    let short = dir.path().join("short.trk");
    fs::write(&short, &bytes[..100]).unwrap();
    let err = extract_seeds_and_streamlines(&short).unwrap_err();
    assert!(matches!(err, SeedError::Load(_, TrkError::Io(_))));
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = tempdir().unwrap();
    let err = extract_seeds_and_streamlines(dir.path().join("nope.trk")).unwrap_err();
    assert!(matches!(err, SeedError::Load(_, TrkError::Io(_))));
}
