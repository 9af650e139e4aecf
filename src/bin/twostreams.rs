//! Two-stream playback and record
//!
//! Three phases against two independently opened streams: a sawtooth
//! playback phase, a recording phase dumped to `test.raw` (headerless
//! little-endian f32 PCM, interleaved), then a quasi-duplex phase copying
//! input straight back to output.
//!
//! Usage: `twostreams N fs` where N = channels and fs = sample rate.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundport::{AudioSystem, Direction, StreamParams};

const BASE_RATE: f64 = 0.005;
const PHASE_SECS: f64 = 2.0;
const BUFFER_SIZE: u32 = 512;
const RECORD_FILE: &str = "test.raw";

fn usage() -> ! {
    eprintln!("\nusage: twostreams N fs");
    eprintln!("    where N = number of channels,");
    eprintln!("    and fs = the sample rate.\n");
    std::process::exit(1);
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        usage();
    }
    let channels: u16 = args[1].parse().unwrap_or_else(|_| usage());
    let sample_rate: u32 = args[2].parse().unwrap_or_else(|_| usage());

    let mut system = AudioSystem::new();
    if system.initialize().is_err() {
        anyhow::bail!("Failed to initialize audio: {}", system.last_error());
    }

    let output_params = StreamParams::new(Direction::Output, channels, sample_rate, BUFFER_SIZE);
    let input_params = StreamParams::new(Direction::Input, channels, sample_rate, BUFFER_SIZE);

    let mut output_stream = match system.open_stream(&output_params) {
        Ok(stream) => stream,
        Err(_) => anyhow::bail!("Failed to open output stream: {}", system.last_error()),
    };
    let mut input_stream = match system.open_stream(&input_params) {
        Ok(stream) => stream,
        Err(_) => anyhow::bail!("Failed to open input stream: {}", system.last_error()),
    };

    let block = BUFFER_SIZE as usize;
    let samples_per_block = block * channels as usize;
    let mut playback = vec![0.0f32; samples_per_block];
    let mut capture = vec![0.0f32; samples_per_block];
    let total_frames = (PHASE_SECS * sample_rate as f64) as usize;

    // Playback phase: one sawtooth per channel, each at its own rate.
    println!(
        "\nStarting sawtooth playback stream for {} seconds.",
        PHASE_SECS
    );
    let mut phase = vec![0.0f64; channels as usize];
    let mut counter = 0usize;
    while counter < total_frames {
        for i in 0..block {
            for (j, p) in phase.iter_mut().enumerate() {
                playback[i * channels as usize + j] = *p as f32;
                *p += BASE_RATE * (j as f64 + 1.0 + j as f64 * 0.1);
                if *p >= 1.0 {
                    *p -= 2.0;
                }
            }
        }
        match output_stream.write(&playback, block) {
            Ok(written) => counter += written,
            Err(_) => anyhow::bail!("Error writing frames: {}", system.last_error()),
        }
    }

    // Recording phase.
    println!("\nStarting recording stream for {} seconds.", PHASE_SECS);
    let mut file = BufWriter::new(
        File::create(RECORD_FILE).with_context(|| format!("Failed to open {}", RECORD_FILE))?,
    );
    counter = 0;
    while counter < total_frames {
        let read = match input_stream.read(&mut capture, block) {
            Ok(read) => read,
            Err(_) => anyhow::bail!("Error reading frames: {}", system.last_error()),
        };
        for sample in &capture[..read * channels as usize] {
            file.write_all(&sample.to_le_bytes())?;
        }
        counter += read;
    }
    file.flush()?;
    println!("\nRecording complete. Wrote to {}", RECORD_FILE);

    // Quasi-duplex phase: copy input straight back to output.
    println!("\nStarting quasi-duplex playback and recording.");
    counter = 0;
    while counter < total_frames {
        let read = match input_stream.read(&mut capture, block) {
            Ok(read) => read,
            Err(_) => anyhow::bail!("Error reading frames in duplex mode: {}", system.last_error()),
        };
        if output_stream
            .write(&capture[..read * channels as usize], read)
            .is_err()
        {
            anyhow::bail!("Error writing frames in duplex mode: {}", system.last_error());
        }
        counter += read;
    }

    input_stream.close();
    output_stream.close();
    system.cleanup();
    Ok(())
}
