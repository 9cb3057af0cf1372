//! PNGS sequence CLI utility
//!
//! A command-line tool for packing PNG images into `.pngs` sequences and
//! getting them back out.
//!
//! # Features
//!
//! - **pack**: Bundle PNG files into a `.pngs` sequence
//! - **unpack**: Write every frame back out as PNG, plus a JSON manifest
//! - **info**: Print the header, metadata and frame table
//! - **verify**: Check that a sequence survives a load/save/load round-trip
//!
//! # Usage
//!
//! ```bash
//! # Pack frames with 80 ms each, looping three times
//! cargo run --example pngs_utils pack a.png b.png c.png -o walk.pngs -d 80 -l 3 -m artist=me
//!
//! # Pack with settings from a TOML file (`level = "fast"`, `prefer_maximized = true`)
//! cargo run --example pngs_utils pack *.png -o walk.pngs --config pack.toml
//!
//! # Unpack to a directory
//! cargo run --example pngs_utils unpack walk.pngs -o walk_frames
//!
//! # Inspect
//! cargo run --example pngs_utils info walk.pngs --json
//! ```

use std::{
	fs,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{debug, info, warn};
use pngs_rs::prelude::file::{
	lz4::CompressionLevel,
	pngs::{File as PngsFile, SaveConfig},
};
use serde::Serialize;

fn main() -> Result<()> {
	env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

	let cli = Cli::parse();
	match cli.command {
		Command::Pack(args) => run_pack(args),
		Command::Unpack(args) => run_unpack(args),
		Command::Info(args) => run_info(args),
		Command::Verify(args) => run_verify(args),
	}
}

#[derive(Parser)]
#[command(name = "pngs_utils")]
#[command(author = "pngs-rs project")]
#[command(version)]
#[command(about = "PNG sequence utility - pack, unpack, inspect and verify .pngs files", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Pack PNG files into a .pngs sequence
	Pack(PackArgs),
	/// Extract every frame of a .pngs sequence as PNG
	Unpack(UnpackArgs),
	/// Show header, metadata and frames of a .pngs sequence
	Info(InfoArgs),
	/// Check that a .pngs sequence round-trips without changes
	Verify(VerifyArgs),
}

#[derive(Args)]
struct PackArgs {
	/// Input PNG files, in playback order
	#[arg(value_name = "PNG", required = true)]
	inputs: Vec<PathBuf>,

	/// Output .pngs file path
	#[arg(short, long, value_name = "OUTPUT")]
	output: PathBuf,

	/// Duration of every frame in milliseconds
	#[arg(short, long, value_name = "MS", default_value_t = 100)]
	duration: u32,

	/// Loop count (-1 loops forever)
	#[arg(short, long, value_name = "COUNT", default_value_t = -1, allow_hyphen_values = true)]
	loop_count: i32,

	/// Metadata entry to attach (repeatable)
	#[arg(short, long = "meta", value_name = "ENTRY")]
	metadata: Vec<String>,

	/// Use the fast compression level
	#[arg(long, default_value_t = false)]
	fast: bool,

	/// Size the header to the largest frame instead of the smallest
	#[arg(long, default_value_t = false)]
	maximize: bool,

	/// TOML file with save settings; flags override it
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,
}

#[derive(Args)]
struct UnpackArgs {
	/// Input .pngs file path
	#[arg(value_name = "FILE")]
	input: PathBuf,

	/// Output directory (defaults to the input name without extension)
	#[arg(short, long, value_name = "DIR")]
	output: Option<PathBuf>,
}

#[derive(Args)]
struct InfoArgs {
	/// Input .pngs file path
	#[arg(value_name = "FILE")]
	input: PathBuf,

	/// Print the report as JSON
	#[arg(long, default_value_t = false)]
	json: bool,
}

#[derive(Args)]
struct VerifyArgs {
	/// Input .pngs file path
	#[arg(value_name = "FILE")]
	input: PathBuf,

	/// Show per-frame results
	#[arg(short, long, default_value_t = false)]
	verbose: bool,
}

/// JSON description of a sequence, written by `unpack` and printed by `info --json`
#[derive(Serialize)]
struct Manifest {
	revision: f32,
	width: u32,
	height: u32,
	loop_count: i32,
	total_duration: u64,
	metadata: Vec<String>,
	frames: Vec<FrameEntry>,
}

#[derive(Serialize)]
struct FrameEntry {
	index: usize,
	duration: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	file: Option<String>,
}

impl Manifest {
	fn from_sequence(sequence: &PngsFile) -> Result<Self> {
		let header = sequence.header().context("Sequence has no header")?;
		Ok(Self {
			revision: header.revision(),
			width: header.descriptor().width,
			height: header.descriptor().height,
			loop_count: header.loop_count(),
			total_duration: sequence.total_duration(),
			metadata: header.metadata().iter().map(str::to_owned).collect(),
			frames: sequence
				.iter()
				.enumerate()
				.map(|(index, frame)| FrameEntry {
					index,
					duration: frame.duration(),
					file: None,
				})
				.collect(),
		})
	}
}

/// Loads save settings from `path`, falling back to defaults for missing keys.
fn load_save_config(path: Option<&Path>) -> Result<SaveConfig> {
	let Some(path) = path else {
		return Ok(SaveConfig::default());
	};

	let settings = config::Config::builder()
		.add_source(config::File::from(path))
		.build()
		.with_context(|| format!("Failed to read config {}", path.display()))?;
	let save_config = settings
		.try_deserialize::<SaveConfig>()
		.with_context(|| format!("Invalid save settings in {}", path.display()))?;

	debug!("Loaded {save_config:?} from {}", path.display());
	Ok(save_config)
}

fn run_pack(args: PackArgs) -> Result<()> {
	let mut save_config = load_save_config(args.config.as_deref())?;
	if args.fast {
		save_config.level = CompressionLevel::Fast;
	}
	if args.maximize {
		save_config.prefer_maximized = true;
	}

	let mut sequence =
		PngsFile::from_png_paths(save_config.prefer_maximized, args.duration, &args.inputs)
			.context("Failed to decode input PNG files")?;
	sequence.set_loop_count(args.loop_count)?;

	for entry in &args.metadata {
		if !sequence.add_metadata(entry.as_str())? {
			warn!("Skipping duplicate metadata entry {entry:?}");
		}
	}

	sequence
		.save_with_config(&args.output, &save_config)
		.with_context(|| format!("Failed to write {}", args.output.display()))?;

	let size = fs::metadata(&args.output)?.len();
	info!(
		"Packed {} frames ({} ms) into {} ({} bytes, {} compression)",
		sequence.frame_count(),
		sequence.total_duration(),
		args.output.display(),
		size,
		save_config.level
	);
	Ok(())
}

fn run_unpack(args: UnpackArgs) -> Result<()> {
	let sequence = PngsFile::open(&args.input)
		.with_context(|| format!("Failed to open {}", args.input.display()))?;

	let output_dir = match args.output {
		Some(dir) => dir,
		None => args.input.with_extension(""),
	};
	if output_dir == args.input {
		bail!("Output directory would overwrite the input file");
	}
	fs::create_dir_all(&output_dir)
		.with_context(|| format!("Failed to create {}", output_dir.display()))?;

	let mut manifest = Manifest::from_sequence(&sequence)?;
	for entry in &mut manifest.frames {
		let name = format!("frame_{:03}.png", entry.index);
		let png = sequence.encode_frame_png(entry.index)?;
		fs::write(output_dir.join(&name), png)
			.with_context(|| format!("Failed to write {name}"))?;
		entry.file = Some(name);
	}

	let manifest_path = output_dir.join("manifest.json");
	fs::write(&manifest_path, serde_json::to_string_pretty(&manifest)?)?;

	info!(
		"Unpacked {} frames to {}",
		manifest.frames.len(),
		output_dir.display()
	);
	Ok(())
}

fn run_info(args: InfoArgs) -> Result<()> {
	let sequence = PngsFile::open(&args.input)
		.with_context(|| format!("Failed to open {}", args.input.display()))?;

	if args.json {
		let manifest = Manifest::from_sequence(&sequence)?;
		println!("{}", serde_json::to_string_pretty(&manifest)?);
		return Ok(());
	}

	println!("File: {}", args.input.display());
	println!("{sequence}");
	println!("{:<8} {:>10}", "Frame", "Duration");
	println!("{}", "-".repeat(19));
	for (index, frame) in sequence.iter().enumerate() {
		println!("{index:<8} {:>7} ms", frame.duration());
	}
	Ok(())
}

fn run_verify(args: VerifyArgs) -> Result<()> {
	let original = PngsFile::open(&args.input)
		.with_context(|| format!("Failed to open {}", args.input.display()))?;
	let bytes = original.to_bytes()?;
	let reloaded = PngsFile::from_bytes(&bytes).context("Re-saved sequence failed to load")?;

	if original.header() != reloaded.header() {
		bail!("Header changed after round-trip");
	}
	if original.frame_count() != reloaded.frame_count() {
		bail!(
			"Frame count changed after round-trip: {} -> {}",
			original.frame_count(),
			reloaded.frame_count()
		);
	}

	let mut mismatches = 0usize;
	for (index, (a, b)) in original.iter().zip(&reloaded).enumerate() {
		let ok = a.duration() == b.duration() && a.pixels() == b.pixels();
		if !ok {
			mismatches += 1;
		}
		if args.verbose || !ok {
			println!("Frame {index:>4}: {}", if ok { "OK" } else { "MISMATCH" });
		}
	}

	if mismatches > 0 {
		bail!("{mismatches} frame(s) differ after round-trip");
	}
	info!(
		"{} verified: {} frames, {} bytes re-saved",
		args.input.display(),
		original.frame_count(),
		bytes.len()
	);
	Ok(())
}
