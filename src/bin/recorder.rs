//! Recorder
//!
//! Captures five seconds of mono audio from the default input device and
//! dumps it to `recording.raw`: headerless little-endian f32 PCM,
//! interleaved by channel.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundport::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};
use soundport::{AudioSystem, Direction, StreamParams};

const RECORD_DURATION_SECS: f64 = 5.0;
const OUTPUT_FILE: &str = "recording.raw";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut system = AudioSystem::new();
    let device_count = match system.initialize() {
        Ok(count) => count,
        Err(_) => anyhow::bail!("Failed to initialize audio: {}", system.last_error()),
    };
    println!("Found {} audio devices", device_count);

    for index in 0..device_count {
        if let Ok(info) = system.device_info(index) {
            println!("Device {}:", index);
            println!("  Max Input Channels: {}", info.max_input_channels);
            println!("  Max Output Channels: {}", info.max_output_channels);
            print!("  Supported Sample Rates:");
            for rate in &info.sample_rates {
                print!(" {}", rate);
            }
            println!();
        }
    }

    let params = StreamParams::new(
        Direction::Input,
        1,
        DEFAULT_SAMPLE_RATE,
        DEFAULT_BUFFER_SIZE,
    );
    let mut stream = match system.open_stream(&params) {
        Ok(stream) => stream,
        Err(_) => anyhow::bail!("Failed to open stream: {}", system.last_error()),
    };

    let mut output = BufWriter::new(
        File::create(OUTPUT_FILE).with_context(|| format!("Failed to open {}", OUTPUT_FILE))?,
    );

    println!("Recording for {:.2} seconds...", RECORD_DURATION_SECS);

    let buffer_size = DEFAULT_BUFFER_SIZE as usize;
    let mut buffer = vec![0.0f32; buffer_size];
    let total_frames = (RECORD_DURATION_SECS * DEFAULT_SAMPLE_RATE as f64) as usize;
    let mut frames_read = 0usize;

    while frames_read < total_frames {
        let request = (total_frames - frames_read).min(buffer_size);
        let read = match stream.read(&mut buffer, request) {
            Ok(read) => read,
            Err(_) => {
                eprintln!("Error reading audio frames: {}", system.last_error());
                break;
            }
        };

        for sample in &buffer[..read] {
            output.write_all(&sample.to_le_bytes())?;
        }
        frames_read += read;
    }

    output.flush()?;
    stream.close();
    system.cleanup();

    println!("Wrote {} frames to {}", frames_read, OUTPUT_FILE);
    Ok(())
}
