//! Device table printer
//!
//! Enumerates the audio devices and prints channel ranges, supported
//! sample rates and native sample formats for each.

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soundport::AudioSystem;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut system = AudioSystem::new();
    let devices = match system.initialize() {
        Ok(count) => count,
        Err(_) => anyhow::bail!("Failed to initialize audio: {}", system.last_error()),
    };

    println!("\nFound {} device(s) ...", devices);

    for index in 0..devices {
        let info = match system.device_info(index) {
            Ok(info) => info,
            Err(_) => {
                eprintln!(
                    "Failed to get info for device {}: {}",
                    index,
                    system.last_error()
                );
                continue;
            }
        };

        println!("\nDevice {}:", index);
        if info.max_output_channels > 0 {
            println!(
                "Output Channels: {} to {}",
                info.min_output_channels, info.max_output_channels
            );
        }
        if info.max_input_channels > 0 {
            println!(
                "Input Channels: {} to {}",
                info.min_input_channels, info.max_input_channels
            );
        }

        print!("Supported Sample Rates:");
        for rate in &info.sample_rates {
            print!(" {}", rate);
        }
        println!();

        println!("Supported Formats:");
        for format in info.native_formats.iter() {
            println!("  {}", format.description());
        }
    }

    system.cleanup();
    Ok(())
}
