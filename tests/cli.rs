#[macro_use]
extern crate pretty_assertions;

mod util;

use std::ffi::OsStr;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;
use trk_seeds::Tractogram;

use util::{seeded_tractogram, streamlines, write_fixture};

fn visualize_seeds<I, S>(args: I) -> Output
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    Command::new(env!("CARGO_BIN_EXE_visualize_seeds"))
        .args(args)
        .output()
        .unwrap()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn help() {
    let output = visualize_seeds(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--dest"));
    assert!(stdout.contains("--overwrite"));
}

#[test]
fn show_prints_a_summary() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[10, 5, 8]));

    let output = visualize_seeds(&[&input]);
    assert!(output.status.success(), "{}", stderr(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("3 streamlines (23 points), 3 seed points"));
}

#[test]
fn screenshot() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[10, 5, 8]));
    let dest = dir.path().join("seeds.png");

    let output = visualize_seeds(&[input.as_os_str(), OsStr::new("--dest"), dest.as_os_str()]);
    assert!(output.status.success(), "{}", stderr(&output));

    let img = image::open(&dest).unwrap();
    assert_eq!((img.width(), img.height()), (1000, 1000));
}

#[test]
fn existing_output_needs_overwrite() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[3]));
    let dest = dir.path().join("seeds.png");
    fs::write(&dest, b"not an image").unwrap();

    let output = visualize_seeds(&[input.as_os_str(), OsStr::new("--dest"), dest.as_os_str()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Use -f to force overwriting"));
    assert_eq!(fs::read(&dest).unwrap(), b"not an image");

    let output = visualize_seeds(&[
        input.as_os_str(),
        OsStr::new("--dest"),
        dest.as_os_str(),
        OsStr::new("-f"),
    ]);
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(image::open(&dest).is_ok());
}

#[test]
fn missing_output_directory() {
    let dir = tempdir().unwrap();
    let input = write_fixture(dir.path(), "seeded.trk", &seeded_tractogram(&[3]));
    let dest = dir.path().join("nowhere").join("seeds.png");

    let output = visualize_seeds(&[input.as_os_str(), OsStr::new("--dest"), dest.as_os_str()]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("does not exist"));
}

#[test]
fn missing_input() {
    let output = visualize_seeds(&[Path::new("/nonexistent/input.trk")]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Input file /nonexistent/input.trk does not exist"));
}

#[test]
fn tractogram_without_seeds() {
    let dir = tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "unseeded.trk",
        &Tractogram::new(streamlines(&[4])),
    );

    let output = visualize_seeds(&[&input]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("error: Tractogram does not contain seeds"));
}

#[test]
fn wrong_format() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("tracks.tck");
    fs::write(&input, b"mrtrix tracks\nEND\n").unwrap();

    let output = visualize_seeds(&[&input]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("must be trk"));
}
