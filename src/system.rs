//! Audio system context
//!
//! [`AudioSystem`] owns the device table and the last-error register. One
//! table exists per context; [`AudioSystem::initialize`] replaces any prior
//! table. Streams opened through the context share its error register but
//! are otherwise independently owned.

use std::sync::Arc;

use crate::device::{supported_rates_in, Device, DeviceInfo, FormatSet};
use crate::error::{AudioError, ErrorState, Result, SharedErrorState};
use crate::host::{default_host, AudioHost, ResourceId};
use crate::stream::{Direction, Stream, StreamParams};

/// Caller-owned audio context.
///
/// Replaces the process-wide state a native audio layer would keep: the
/// discovered device table and the last-error message both live here.
pub struct AudioSystem {
    host: Arc<dyn AudioHost>,
    devices: Vec<Device>,
    errors: SharedErrorState,
}

impl AudioSystem {
    /// Context over the default host for this process.
    pub fn new() -> Self {
        Self::with_host(default_host())
    }

    /// Context over a specific host implementation.
    pub fn with_host(host: Arc<dyn AudioHost>) -> Self {
        Self {
            host,
            devices: Vec::new(),
            errors: Arc::new(ErrorState::new()),
        }
    }

    /// Build (or rebuild) the device table; returns the device count.
    ///
    /// Whole-protocol failures (device count, resource-handle fetch) abort
    /// with [`AudioError::EnumerationFailed`]. Per-resource capability
    /// failures are non-fatal: the affected entry keeps zeroed fields, the
    /// diagnostic lands in the error register, and enumeration continues.
    /// Zero devices is a valid result, not an error.
    pub fn initialize(&mut self) -> Result<i32> {
        self.devices.clear();

        let count = match self.host.device_count() {
            Ok(count) => count,
            Err(e) => {
                return self.fail(AudioError::EnumerationFailed(format!(
                    "Error counting devices: {}",
                    e
                )))
            }
        };
        if count <= 0 {
            return Ok(0);
        }

        let outputs = match self.host.output_resources(count as usize) {
            Ok(resources) => resources,
            Err(e) => {
                return self.fail(AudioError::EnumerationFailed(format!(
                    "Error getting output devices: {}",
                    e
                )))
            }
        };
        let mut devices = Vec::with_capacity(count as usize);
        for resource in outputs {
            devices.push(self.probe(resource, Direction::Output));
        }

        let remaining = (count as usize).saturating_sub(devices.len());
        let inputs = match self.host.input_resources(remaining) {
            Ok(resources) => resources,
            Err(e) => {
                return self.fail(AudioError::EnumerationFailed(format!(
                    "Error getting input devices: {}",
                    e
                )))
            }
        };
        for resource in inputs {
            devices.push(self.probe(resource, Direction::Input));
        }

        // Slots the service counted but exposed no handle for stay zeroed.
        devices.resize_with(count as usize, Device::default);

        tracing::debug!(count, "audio device table built");
        self.devices = devices;
        Ok(count)
    }

    /// Current device table length. Zero before initialization.
    pub fn device_count(&self) -> i32 {
        self.devices.len() as i32
    }

    /// Snapshot of one device's capabilities.
    pub fn device_info(&self, index: i32) -> Result<DeviceInfo> {
        if index < 0 || index as usize >= self.devices.len() {
            return self.fail(AudioError::InvalidIndex(index));
        }
        Ok(self.devices[index as usize].info())
    }

    /// Release the device table. Safe to call when no table exists.
    pub fn cleanup(&mut self) {
        self.devices.clear();
    }

    /// Open a stream against the host's default resource for the requested
    /// direction.
    ///
    /// Negotiation happens in order: parameter validation, channel count,
    /// port open, sample rate. A rate failure releases the just-opened
    /// port before the error is returned.
    pub fn open_stream(&self, params: &StreamParams) -> Result<Stream> {
        if let Err(e) = params.validate() {
            return self.fail(e);
        }

        let resource = match self.host.default_resource(params.direction) {
            Ok(resource) => resource,
            Err(e) => {
                return self.fail(AudioError::DeviceNotFound(format!(
                    "no default {} device: {}",
                    params.direction, e
                )))
            }
        };

        if let Err(e) = self.host.negotiate_channels(resource, params.channels) {
            return self.fail(AudioError::ChannelNegotiationFailed {
                channels: params.channels,
                reason: e.to_string(),
            });
        }

        let port = match self.host.open_port(
            resource,
            params.direction,
            params.channels,
            params.buffer_size,
        ) {
            Ok(port) => port,
            Err(e) => return self.fail(AudioError::PortOpenFailed(e.to_string())),
        };

        if let Err(e) = self.host.set_rate(resource, params.sample_rate) {
            // No leaked port on partial failure.
            drop(port);
            return self.fail(AudioError::RateNegotiationFailed {
                rate: params.sample_rate,
                reason: e.to_string(),
            });
        }

        tracing::debug!(
            direction = %params.direction,
            channels = params.channels,
            sample_rate = params.sample_rate,
            buffer_size = params.buffer_size,
            "opened audio stream"
        );
        Ok(Stream::new(port, params, self.errors.clone()))
    }

    /// Most recent failure description; empty before any failure.
    pub fn last_error(&self) -> String {
        self.errors.last()
    }

    /// Query one resource's capabilities for one direction.
    ///
    /// A failed channel query leaves the entry zeroed apart from the
    /// resource handle and skips the remaining queries; a failed rate
    /// query only leaves the rate list empty. Either failure is recorded
    /// in the error register for diagnostics without failing the build.
    fn probe(&self, resource: ResourceId, direction: Direction) -> Device {
        let mut device = Device::default();
        match direction {
            Direction::Output => device.output_resource = Some(resource),
            Direction::Input => device.input_resource = Some(resource),
        }

        let channels = match self.host.channel_count(resource) {
            Ok(channels) => channels,
            Err(e) => {
                self.errors.record(&AudioError::EnumerationFailed(format!(
                    "Error getting {} channels: {}",
                    direction, e
                )));
                return device;
            }
        };
        match direction {
            Direction::Output => {
                device.max_output_channels = channels;
                device.min_output_channels = 1;
            }
            Direction::Input => {
                device.max_input_channels = channels;
                device.min_input_channels = 1;
            }
        }
        device.native_formats = FormatSet::NATIVE;

        match self.host.rate_range(resource) {
            Ok((min, max)) => device.sample_rates = supported_rates_in(min, max),
            Err(e) => {
                self.errors.record(&AudioError::EnumerationFailed(format!(
                    "Error getting {} sample rates: {}",
                    direction, e
                )));
            }
        }

        device
    }

    fn fail<T>(&self, err: AudioError) -> Result<T> {
        self.errors.record(&err);
        Err(err)
    }
}

impl Default for AudioSystem {
    fn default() -> Self {
        Self::new()
    }
}
