//! # soundport
//!
//! Small hardware-audio abstraction layer: enumerate the devices a native
//! audio service exposes, report their capabilities, and move fixed-size
//! blocks of interleaved f32 frames through blocking input/output streams.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      AudioSystem                         │
//! │  ┌──────────────┐  ┌───────────────┐  ┌──────────────┐   │
//! │  │ Device Table │  │ Error State   │  │ open_stream  │   │
//! │  │ (capability  │  │ (last-error   │  └──────┬───────┘   │
//! │  │  prober)     │  │  register)    │         │           │
//! │  └──────┬───────┘  └───────────────┘         ▼           │
//! │         │                              ┌──────────┐      │
//! │         │          count / handles /   │  Stream  │      │
//! │         ▼          channels / rates    │ rd / wr  │      │
//! │  ┌─────────────────────────────────┐   └────┬─────┘      │
//! │  │        AudioHost (trait)        │◄───────┘ port I/O   │
//! │  └─────────────────────────────────┘                     │
//! │     SoftwareHost (built-in loopback) / native backends   │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is synchronous and blocking. Duplex operation is two
//! independent streams, one per direction, driven from two threads.
//!
//! ```no_run
//! use soundport::{AudioSystem, Direction, StreamParams};
//!
//! # fn main() -> soundport::Result<()> {
//! let mut system = AudioSystem::new();
//! let count = system.initialize()?;
//! println!("found {} device(s)", count);
//!
//! let params = StreamParams::new(Direction::Output, 1, 44100, 256);
//! let mut stream = system.open_stream(&params)?;
//! let silence = vec![0.0f32; 256];
//! stream.write(&silence, 256)?;
//! stream.close();
//! system.cleanup();
//! # Ok(())
//! # }
//! ```

pub mod device;
pub mod error;
pub mod host;
pub mod stream;
pub mod system;

pub use device::{DeviceInfo, FormatSet, SampleFormat, CANONICAL_SAMPLE_RATES};
pub use error::{AudioError, Result};
pub use stream::{Direction, Stream, StreamParams};
pub use system::AudioSystem;

/// Library-wide constants
pub mod constants {
    /// Default sample rate for the demo programs
    pub const DEFAULT_SAMPLE_RATE: u32 = 44100;

    /// Default transfer block size in frames
    pub const DEFAULT_BUFFER_SIZE: u32 = 256;
}
