//! Visualize seeds where streamlines originate from in a tractogram.

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use trk_seeds::render::WHITE;
use trk_seeds::{extract_seeds_and_streamlines, Actor, RasterRenderer, Renderer, Scene};

/// Size of the recorded screenshot, in pixels.
const SCREENSHOT_SIZE: (u32, u32) = (1000, 1000);

#[derive(Parser, Debug)]
#[command(name = "visualize_seeds")]
#[command(version)]
#[command(about = "Visualize seeds where streamlines originate from in a tractogram", long_about = None)]
struct Args {
    /// Tractogram file
    tractogram: PathBuf,

    /// If set, save a screenshot of the result at the specified path
    #[arg(long)]
    dest: Option<PathBuf>,

    /// Force overwriting of the output files
    #[arg(short = 'f', long = "overwrite")]
    overwrite: bool,
}

fn assert_inputs_exist(inputs: &[&Path]) -> Result<()> {
    for input in inputs {
        if !input.is_file() {
            bail!("Input file {} does not exist", input.display());
        }
    }
    Ok(())
}

fn assert_outputs_exist(overwrite: bool, outputs: &[&Path]) -> Result<()> {
    for output in outputs {
        if output.exists() && !overwrite {
            bail!(
                "Output file {} exists. Use -f to force overwriting",
                output.display()
            );
        }
        let parent = output.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(dir) = parent {
            if !dir.is_dir() {
                bail!(
                    "Directory {} for output file {} does not exist",
                    dir.display(),
                    output.display()
                );
            }
        }
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    assert_inputs_exist(&[&args.tractogram])?;
    let outputs: Vec<&Path> = args.dest.iter().map(PathBuf::as_path).collect();
    assert_outputs_exist(args.overwrite, &outputs)?;

    let seeded = extract_seeds_and_streamlines(&args.tractogram)?;

    let mut scene = Scene::new();
    scene.add(Actor::line(seeded.streamlines()));
    scene.add(Actor::dots(&seeded.flat_seed_points(), WHITE));

    let mut renderer = RasterRenderer::new();
    if let Some(dest) = &args.dest {
        renderer
            .record(&scene, dest, SCREENSHOT_SIZE)
            .with_context(|| format!("Could not record {}", dest.display()))?;
    }
    renderer.show(&scene)?;
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    log::debug!("{:?}", args);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
