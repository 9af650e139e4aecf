//! In-process software host
//!
//! Emulates one duplex loopback device: samples written to the output port
//! land in a bounded ring and come back out of the input port. Transfers
//! are paced against a master clock so blocking read/write calls take the
//! wall-clock time real hardware would, and an idle input produces silence
//! the way a quiet microphone does.
//!
//! Following the native table layout, the single physical device shows up
//! as two table entries: one output-capable, one input-capable.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::host::{AudioHost, AudioPort, HostError, HostResult, ResourceId};
use crate::stream::Direction;

const OUTPUT_RESOURCE: ResourceId = 1;
const INPUT_RESOURCE: ResourceId = 2;

const MAX_CHANNELS: u16 = 2;
const MIN_RATE: u32 = 8000;
const MAX_RATE: u32 = 48000;
const DEFAULT_RATE: u32 = 44100;

/// Loopback ring capacity in samples (~0.74 s of stereo at 44.1 kHz).
const RING_CAPACITY: usize = 1 << 16;

/// Software loopback host, the default [`AudioHost`] for this process.
pub struct SoftwareHost {
    clock_rate: Arc<AtomicU32>,
    ring_tx: Sender<f32>,
    ring_rx: Receiver<f32>,
}

impl SoftwareHost {
    pub fn new() -> Self {
        let (ring_tx, ring_rx) = bounded(RING_CAPACITY);
        Self {
            clock_rate: Arc::new(AtomicU32::new(DEFAULT_RATE)),
            ring_tx,
            ring_rx,
        }
    }
}

impl Default for SoftwareHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioHost for SoftwareHost {
    fn device_count(&self) -> HostResult<i32> {
        Ok(2)
    }

    fn output_resources(&self, limit: usize) -> HostResult<Vec<ResourceId>> {
        Ok([OUTPUT_RESOURCE].into_iter().take(limit).collect())
    }

    fn input_resources(&self, limit: usize) -> HostResult<Vec<ResourceId>> {
        Ok([INPUT_RESOURCE].into_iter().take(limit).collect())
    }

    fn channel_count(&self, resource: ResourceId) -> HostResult<u16> {
        match resource {
            OUTPUT_RESOURCE | INPUT_RESOURCE => Ok(MAX_CHANNELS),
            _ => Err(HostError::new(format!("unknown resource {}", resource))),
        }
    }

    fn rate_range(&self, resource: ResourceId) -> HostResult<(u32, u32)> {
        match resource {
            OUTPUT_RESOURCE | INPUT_RESOURCE => Ok((MIN_RATE, MAX_RATE)),
            _ => Err(HostError::new(format!("unknown resource {}", resource))),
        }
    }

    fn default_resource(&self, direction: Direction) -> HostResult<ResourceId> {
        Ok(match direction {
            Direction::Output => OUTPUT_RESOURCE,
            Direction::Input => INPUT_RESOURCE,
        })
    }

    fn negotiate_channels(&self, _resource: ResourceId, channels: u16) -> HostResult<()> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(HostError::new(format!(
                "loopback device supports 1 to {} channels",
                MAX_CHANNELS
            )));
        }
        Ok(())
    }

    fn open_port(
        &self,
        resource: ResourceId,
        direction: Direction,
        _channels: u16,
        _buffer_frames: u32,
    ) -> HostResult<Box<dyn AudioPort>> {
        let expected = match direction {
            Direction::Output => OUTPUT_RESOURCE,
            Direction::Input => INPUT_RESOURCE,
        };
        if resource != expected {
            return Err(HostError::new(format!(
                "resource {} is not {}-capable",
                resource, direction
            )));
        }
        Ok(Box::new(SoftwarePort {
            direction,
            ring_tx: self.ring_tx.clone(),
            ring_rx: self.ring_rx.clone(),
            clock_rate: self.clock_rate.clone(),
        }))
    }

    fn set_rate(&self, _resource: ResourceId, rate: u32) -> HostResult<()> {
        if !(MIN_RATE..=MAX_RATE).contains(&rate) {
            return Err(HostError::new(format!(
                "rate {} Hz outside supported range {}..={}",
                rate, MIN_RATE, MAX_RATE
            )));
        }
        self.clock_rate.store(rate, Ordering::Relaxed);
        Ok(())
    }
}

struct SoftwarePort {
    direction: Direction,
    ring_tx: Sender<f32>,
    ring_rx: Receiver<f32>,
    clock_rate: Arc<AtomicU32>,
}

impl SoftwarePort {
    /// Block for the wall-clock duration of `frames` at the master clock.
    fn pace(&self, frames: usize) {
        let rate = self.clock_rate.load(Ordering::Relaxed).max(1);
        thread::sleep(Duration::from_secs_f64(frames as f64 / rate as f64));
    }
}

impl AudioPort for SoftwarePort {
    fn write_frames(&mut self, interleaved: &[f32], frames: usize) -> HostResult<usize> {
        if self.direction != Direction::Output {
            return Err(HostError::new("port opened for reading"));
        }
        for &sample in interleaved {
            // A full ring means no input port is draining; the hardware
            // analogue is an overrun, the sample is lost.
            let _ = self.ring_tx.try_send(sample);
        }
        self.pace(frames);
        Ok(frames)
    }

    fn read_frames(&mut self, interleaved: &mut [f32], frames: usize) -> HostResult<usize> {
        if self.direction != Direction::Input {
            return Err(HostError::new("port opened for writing"));
        }
        for slot in interleaved.iter_mut() {
            // Silence when nothing has been played into the loopback.
            *slot = self.ring_rx.try_recv().unwrap_or(0.0);
        }
        self.pace(frames);
        Ok(frames)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_table_entries_for_one_loopback_device() {
        let host = SoftwareHost::new();
        assert_eq!(host.device_count().unwrap(), 2);
        assert_eq!(host.output_resources(2).unwrap(), vec![OUTPUT_RESOURCE]);
        assert_eq!(host.input_resources(1).unwrap(), vec![INPUT_RESOURCE]);
        assert!(host.output_resources(0).unwrap().is_empty());
    }

    #[test]
    fn test_rate_outside_range_is_rejected() {
        let host = SoftwareHost::new();
        assert!(host.set_rate(OUTPUT_RESOURCE, 4000).is_err());
        assert!(host.set_rate(OUTPUT_RESOURCE, 192000).is_err());
        assert!(host.set_rate(OUTPUT_RESOURCE, 48000).is_ok());
    }

    #[test]
    fn test_loopback_round_trip() {
        let host = SoftwareHost::new();
        host.set_rate(OUTPUT_RESOURCE, 48000).unwrap();
        let mut out = host
            .open_port(OUTPUT_RESOURCE, Direction::Output, 1, 64)
            .unwrap();
        let mut inp = host
            .open_port(INPUT_RESOURCE, Direction::Input, 1, 64)
            .unwrap();

        let played: Vec<f32> = (0..64).map(|i| i as f32 / 64.0).collect();
        assert_eq!(out.write_frames(&played, 64).unwrap(), 64);

        let mut captured = vec![0.0f32; 64];
        assert_eq!(inp.read_frames(&mut captured, 64).unwrap(), 64);
        assert_eq!(captured, played);
    }

    #[test]
    fn test_idle_input_reads_silence() {
        let host = SoftwareHost::new();
        let mut inp = host
            .open_port(INPUT_RESOURCE, Direction::Input, 1, 32)
            .unwrap();
        let mut buf = vec![1.0f32; 32];
        inp.read_frames(&mut buf, 32).unwrap();
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_port_direction_is_enforced() {
        let host = SoftwareHost::new();
        let mut out = host
            .open_port(OUTPUT_RESOURCE, Direction::Output, 1, 32)
            .unwrap();
        let mut buf = vec![0.0f32; 32];
        assert!(out.read_frames(&mut buf, 32).is_err());
    }

    #[test]
    fn test_mismatched_resource_rejected() {
        let host = SoftwareHost::new();
        assert!(host
            .open_port(INPUT_RESOURCE, Direction::Output, 1, 32)
            .is_err());
    }
}
