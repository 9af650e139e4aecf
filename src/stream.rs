//! Audio streams
//!
//! A [`Stream`] is an opened input-or-output channel bound to one device
//! resource. Direction, channel count, sample rate and buffer size are
//! fixed at open; the only state transition afterwards is open -> closed.
//! Reads and writes block until the platform has transferred the requested
//! frames or failed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AudioError, Result, SharedErrorState};
use crate::host::AudioPort;

/// Transfer direction of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// Parameters for opening a stream.
///
/// There is no default negotiation: the open fails unless the platform
/// accepts exactly these values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamParams {
    pub direction: Direction,
    /// Channels per frame, > 0
    pub channels: u16,
    /// Sample rate in Hz, > 0
    pub sample_rate: u32,
    /// Transfer block size in frames, > 0
    pub buffer_size: u32,
}

impl StreamParams {
    pub fn new(direction: Direction, channels: u16, sample_rate: u32, buffer_size: u32) -> Self {
        Self {
            direction,
            channels,
            sample_rate,
            buffer_size,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.channels == 0 {
            return Err(AudioError::InvalidParameters(
                "channel count must be positive".into(),
            ));
        }
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidParameters(
                "sample rate must be positive".into(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(AudioError::InvalidParameters(
                "buffer size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// An opened audio stream.
///
/// Owned by its creator from open until close. Closing is idempotent and
/// also happens on drop, so the platform port cannot leak; any use after
/// close fails with [`AudioError::StreamClosed`] instead of crashing.
pub struct Stream {
    port: Option<Box<dyn AudioPort>>,
    direction: Direction,
    channels: u16,
    sample_rate: u32,
    buffer_size: u32,
    errors: SharedErrorState,
}

impl Stream {
    pub(crate) fn new(
        port: Box<dyn AudioPort>,
        params: &StreamParams,
        errors: SharedErrorState,
    ) -> Self {
        Self {
            port: Some(port),
            direction: params.direction,
            channels: params.channels,
            sample_rate: params.sample_rate,
            buffer_size: params.buffer_size,
            errors,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Transfer block size in frames, as requested at open.
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn is_open(&self) -> bool {
        self.port.is_some()
    }

    /// Blocking read of up to `frames` interleaved frames into `buffer`.
    ///
    /// `buffer` must hold at least `frames * channels` samples. Returns the
    /// number of frames actually transferred.
    pub fn read(&mut self, buffer: &mut [f32], frames: usize) -> Result<usize> {
        if self.direction != Direction::Input {
            return self.fail(AudioError::DirectionMismatch {
                operation: "read",
                direction: self.direction,
            });
        }
        let samples = self.transfer_len(buffer.len(), frames)?;
        let port = match self.port.as_mut() {
            Some(port) => port,
            None => {
                let err = AudioError::StreamClosed;
                self.errors.record(&err);
                return Err(err);
            }
        };
        match port.read_frames(&mut buffer[..samples], frames) {
            Ok(transferred) => Ok(transferred),
            Err(e) => self.fail(AudioError::Io(format!("Error reading frames: {}", e))),
        }
    }

    /// Blocking write of up to `frames` interleaved frames from `buffer`.
    ///
    /// Symmetric to [`Stream::read`].
    pub fn write(&mut self, buffer: &[f32], frames: usize) -> Result<usize> {
        if self.direction != Direction::Output {
            return self.fail(AudioError::DirectionMismatch {
                operation: "write",
                direction: self.direction,
            });
        }
        let samples = self.transfer_len(buffer.len(), frames)?;
        let port = match self.port.as_mut() {
            Some(port) => port,
            None => {
                let err = AudioError::StreamClosed;
                self.errors.record(&err);
                return Err(err);
            }
        };
        match port.write_frames(&buffer[..samples], frames) {
            Ok(transferred) => Ok(transferred),
            Err(e) => self.fail(AudioError::Io(format!("Error writing frames: {}", e))),
        }
    }

    /// Release the platform port. Safe to call more than once.
    pub fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::debug!(
                direction = %self.direction,
                sample_rate = self.sample_rate,
                "closed audio stream"
            );
        }
    }

    fn transfer_len(&self, buffer_len: usize, frames: usize) -> Result<usize> {
        let samples = frames * self.channels as usize;
        if buffer_len < samples {
            let err = AudioError::InvalidParameters(format!(
                "buffer holds {} samples, {} frames need {}",
                buffer_len, frames, samples
            ));
            self.errors.record(&err);
            return Err(err);
        }
        Ok(samples)
    }

    fn fail<T>(&self, err: AudioError) -> Result<T> {
        self.errors.record(&err);
        Err(err)
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("direction", &self.direction)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("buffer_size", &self.buffer_size)
            .field("open", &self.is_open())
            .finish()
    }
}
