//! Loopback
//!
//! Opens an input stream and an output stream against the default devices
//! and copies frames from one to the other for five seconds. Duplex here
//! is two independent streams; the copy loop is the application-level glue
//! the core deliberately does not provide.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundport::constants::{DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};
use soundport::{AudioSystem, Direction, StreamParams};

const LOOPBACK_DURATION_SECS: f64 = 5.0;

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

    let input_params = StreamParams::new(
        Direction::Input,
        1,
        DEFAULT_SAMPLE_RATE,
        DEFAULT_BUFFER_SIZE,
    );
    let output_params = StreamParams::new(
        Direction::Output,
        1,
        DEFAULT_SAMPLE_RATE,
        DEFAULT_BUFFER_SIZE,
    );

    let mut input_stream = match system.open_stream(&input_params) {
        Ok(stream) => stream,
        Err(_) => anyhow::bail!("Failed to open input stream: {}", system.last_error()),
    };
    let mut output_stream = match system.open_stream(&output_params) {
        Ok(stream) => stream,
        Err(_) => anyhow::bail!("Failed to open output stream: {}", system.last_error()),
    };

    let buffer_size = DEFAULT_BUFFER_SIZE as usize;
    let mut buffer = vec![0.0f32; buffer_size];
    let total_frames = (LOOPBACK_DURATION_SECS * DEFAULT_SAMPLE_RATE as f64) as usize;
    let mut frames_processed = 0usize;

    println!(
        "Starting audio loopback test for {:.2} seconds...",
        LOOPBACK_DURATION_SECS
    );

    while frames_processed < total_frames {
        let request = (total_frames - frames_processed).min(buffer_size);

        let read = match input_stream.read(&mut buffer, request) {
            Ok(read) => read,
            Err(_) => {
                eprintln!("Error reading input frames: {}", system.last_error());
                break;
            }
        };

        if output_stream.write(&buffer[..read], read).is_err() {
            eprintln!("Error writing output frames: {}", system.last_error());
            break;
        }

        frames_processed += read;
    }

    input_stream.close();
    output_stream.close();
    system.cleanup();

    println!("Loopback finished after {} frames", frames_processed);
    Ok(())
}
