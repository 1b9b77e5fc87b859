use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use lane_cal::calibration::{CalibrationState, CalibrationStore};
use lane_cal::models::{DisplayFrame, Mask};
use lane_cal::pipeline::{Detection, analyze, spawn_frame_reader};
use lane_cal::protocol::{DecodeError, StreamEvent, decoder};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lanecal", version, about = "Lane camera calibration tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the frames in a captured serial dump
    Inspect {
        #[arg(long)]
        dump: PathBuf,
    },
    /// Run both detection channels over every frame in a dump
    Replay {
        #[arg(long)]
        dump: PathBuf,
        /// Calibration JSON saved by the tuning UI; built-in defaults if omitted
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Write normalized frames and masks as PNGs into this directory
        #[arg(long)]
        dump_dir: Option<PathBuf>,
        /// Record the last detected outside line as the ideal position
        #[arg(long)]
        record_line: bool,
        /// Write the final calibration back out as JSON
        #[arg(long)]
        save_settings: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Inspect { dump } => inspect_cmd(&dump),
        Command::Replay {
            dump,
            settings,
            dump_dir,
            record_line,
            save_settings,
        } => replay_cmd(
            &dump,
            settings.as_deref(),
            dump_dir.as_deref(),
            record_line,
            save_settings.as_deref(),
        ),
    }
}

fn inspect_cmd(dump: &Path) -> Result<()> {
    let mut source = open_dump(dump)?;
    let mut index = 0usize;
    loop {
        match decoder::read_event(&mut source) {
            Ok(StreamEvent::Frame(frame)) => {
                let header = frame.header();
                println!(
                    "frame {index}: {}x{} x{} {}",
                    header.cols,
                    header.rows,
                    header.channels,
                    header.format.tag()
                );
                index += 1;
            }
            Ok(StreamEvent::Center(x)) => println!("device center line at x={x}"),
            Ok(StreamEvent::OutsideLine(x)) => println!("device solid line at x={x}"),
            Err(DecodeError::TruncatedStream) => break,
            Err(err) => eprintln!("frame {index}: {err}, rescanning"),
        }
    }
    println!("{index} frames");
    Ok(())
}

fn replay_cmd(
    dump: &Path,
    settings: Option<&Path>,
    dump_dir: Option<&Path>,
    record_line: bool,
    save_settings: Option<&Path>,
) -> Result<()> {
    let state = match settings {
        Some(path) => load_settings(path)?,
        None => CalibrationState::default(),
    };
    let store = CalibrationStore::new(state);

    if let Some(dir) = dump_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating dump directory {}", dir.display()))?;
    }

    let receiver = spawn_frame_reader(open_dump(dump)?);
    let mut index = 0usize;
    while let Some(frame) = receiver.recv() {
        let analysis = analyze(frame, &store.snapshot());
        let telemetry = receiver.telemetry();
        let mut device = String::new();
        if let Some(x) = telemetry.center {
            device.push_str(&format!("  device-center: x={x}"));
        }
        if let Some(x) = telemetry.outside_line {
            device.push_str(&format!("  device-solid: x={x}"));
        }
        println!(
            "frame {index}: {}x{}  outside: {}  stop: {}{device}",
            analysis.frame.cols,
            analysis.frame.rows,
            describe(&analysis.outside),
            describe(&analysis.stop),
        );

        if record_line {
            store.update(|state| {
                state.record_outside_line(&analysis.outside);
            });
        }

        if let Some(dir) = dump_dir {
            save_frame_png(&analysis.frame, &dir.join(format!("frame_{index:04}.png")))?;
            save_mask_png(
                &analysis.outside_mask,
                &dir.join(format!("outside_{index:04}.png")),
            )?;
            save_mask_png(&analysis.stop_mask, &dir.join(format!("stop_{index:04}.png")))?;
        }
        index += 1;
    }
    println!("{index} frames");

    if let Some(path) = save_settings {
        let json = serde_json::to_string_pretty(&store.snapshot())
            .context("serializing calibration state")?;
        fs::write(path, json).with_context(|| format!("writing settings {}", path.display()))?;
        println!("settings written to {}", path.display());
    }
    Ok(())
}

fn open_dump(dump: &Path) -> Result<BufReader<File>> {
    let file = File::open(dump).with_context(|| format!("opening dump {}", dump.display()))?;
    Ok(BufReader::new(file))
}

fn load_settings(path: &Path) -> Result<CalibrationState> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("reading settings {}", path.display()))?;
    let mut state: CalibrationState = serde_json::from_str(&json)
        .with_context(|| format!("parsing settings {}", path.display()))?;
    state.sanitize();
    Ok(state)
}

fn describe(detection: &Detection) -> String {
    match (detection.found, detection.bounding_box) {
        (true, Some(rect)) => format!("x={} area={}", rect.center_x(), rect.area()),
        (false, Some(rect)) => format!("none (largest area {})", rect.area()),
        _ => "none".to_string(),
    }
}

fn save_frame_png(frame: &DisplayFrame, path: &Path) -> Result<()> {
    let width = frame.cols as u32;
    let height = frame.rows as u32;
    match frame.channels {
        3 => {
            let img = image::RgbImage::from_raw(width, height, frame.data.clone())
                .context("frame buffer does not match its dimensions")?;
            img.save(path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        1 => {
            let img = image::GrayImage::from_raw(width, height, frame.data.clone())
                .context("frame buffer does not match its dimensions")?;
            img.save(path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        channels => bail!("cannot render a {channels}-channel frame"),
    }
    Ok(())
}

fn save_mask_png(mask: &Mask, path: &Path) -> Result<()> {
    let img = image::GrayImage::from_raw(
        mask.width() as u32,
        mask.height() as u32,
        mask.as_bytes().to_vec(),
    )
    .context("mask buffer does not match its dimensions")?;
    img.save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}
