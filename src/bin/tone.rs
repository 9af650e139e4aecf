//! Tone generator
//!
//! Plays a 440 Hz sine for five seconds through the default output device
//! in buffer-sized blocking writes.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundport::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};
use soundport::{AudioSystem, Direction, StreamParams};

const DURATION_SECS: f64 = 5.0;
const FREQUENCY_HZ: f32 = 440.0;

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

    let params = StreamParams::new(
        Direction::Output,
        1,
        DEFAULT_SAMPLE_RATE,
        DEFAULT_BUFFER_SIZE,
    );
    let mut stream = match system.open_stream(&params) {
        Ok(stream) => stream,
        Err(_) => anyhow::bail!("Failed to open stream: {}", system.last_error()),
    };

    let buffer_size = DEFAULT_BUFFER_SIZE as usize;
    let mut buffer = vec![0.0f32; buffer_size];
    let total_frames = (DURATION_SECS * DEFAULT_SAMPLE_RATE as f64) as usize;
    let mut frames_written = 0usize;

    while frames_written < total_frames {
        for (j, sample) in buffer.iter_mut().enumerate() {
            let t = (frames_written + j) as f32 / DEFAULT_SAMPLE_RATE as f32;
            *sample = 0.5 * (2.0 * std::f32::consts::PI * FREQUENCY_HZ * t).sin();
        }

        let request = (total_frames - frames_written).min(buffer_size);
        match stream.write(&buffer[..request], request) {
            Ok(written) => frames_written += written,
            Err(_) => {
                eprintln!("Error writing audio frames: {}", system.last_error());
                break;
            }
        }
    }

    stream.close();
    system.cleanup();

    println!("Played sine wave for {:.2} seconds", DURATION_SECS);
    Ok(())
}
