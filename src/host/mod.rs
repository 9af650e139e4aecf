//! Audio host abstraction
//!
//! [`AudioHost`] is the seam between the portable layer and a native audio
//! service. It models the capability-query protocol those services expose:
//! count the devices, fetch typed resource handles for the output-capable
//! and input-capable ones, then query channels and rate ranges per resource.
//! Streams open an [`AudioPort`] against a resource and move interleaved
//! f32 frames through it with blocking calls.
//!
//! The built-in [`software::SoftwareHost`] is the default implementation; it
//! emulates one duplex loopback device entirely in-process so the crate and
//! its demo binaries run on machines without audio hardware.

use std::sync::Arc;

use thiserror::Error;

use crate::stream::Direction;

pub mod software;

#[cfg(test)]
pub(crate) mod mock;

/// Opaque platform identifier for a device resource in one direction.
pub type ResourceId = u32;

/// Diagnostic text from a failed host call.
///
/// The portable layer wraps these into [`crate::AudioError`] variants named
/// after the operation that failed.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct HostError(pub String);

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Result type for host calls
pub type HostResult<T> = std::result::Result<T, HostError>;

/// Interface to a native audio service.
///
/// Capability queries may fail per-resource even when the resource handle
/// itself is valid; callers are expected to tolerate partial capability
/// data. The two-phase count-then-fetch shape is an implementation detail
/// of the enumeration and never leaks into the public surface.
pub trait AudioHost: Send + Sync {
    /// Total number of device table slots the service reports.
    fn device_count(&self) -> HostResult<i32>;

    /// Resource handles for output-capable devices, at most `limit`.
    fn output_resources(&self, limit: usize) -> HostResult<Vec<ResourceId>>;

    /// Resource handles for input-capable devices, at most `limit`.
    fn input_resources(&self, limit: usize) -> HostResult<Vec<ResourceId>>;

    /// Maximum channel count of a resource.
    fn channel_count(&self, resource: ResourceId) -> HostResult<u16>;

    /// Inclusive `(min, max)` sample-rate range of a resource, in Hz.
    fn rate_range(&self, resource: ResourceId) -> HostResult<(u32, u32)>;

    /// The service's default resource for a direction.
    fn default_resource(&self, direction: Direction) -> HostResult<ResourceId>;

    /// Validate a channel count against a fresh port configuration.
    fn negotiate_channels(&self, resource: ResourceId, channels: u16) -> HostResult<()>;

    /// Open a port on a resource. Dropping the returned port releases it.
    fn open_port(
        &self,
        resource: ResourceId,
        direction: Direction,
        channels: u16,
        buffer_frames: u32,
    ) -> HostResult<Box<dyn AudioPort>>;

    /// Apply a sample rate (and the service's reference clock) to a
    /// resource. Affects ports already open on it.
    fn set_rate(&self, resource: ResourceId, rate: u32) -> HostResult<()>;
}

/// An opened platform audio port.
///
/// Transfers are blocking: a call returns only once the requested frames
/// have moved through the hardware ring buffer or the transfer failed.
/// Dropping the port releases the platform resource.
pub trait AudioPort: Send {
    /// Blocking write of interleaved samples; returns frames transferred.
    fn write_frames(&mut self, interleaved: &[f32], frames: usize) -> HostResult<usize>;

    /// Blocking read into an interleaved buffer; returns frames transferred.
    fn read_frames(&mut self, interleaved: &mut [f32], frames: usize) -> HostResult<usize>;
}

/// The default host for this process.
pub fn default_host() -> Arc<dyn AudioHost> {
    Arc::new(software::SoftwareHost::new())
}
