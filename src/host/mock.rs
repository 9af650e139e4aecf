//! Scriptable host for unit tests
//!
//! Every step of the enumeration and stream-open protocol can be made to
//! fail independently, mirroring how a native capability API fails
//! per-parameter. Ports count themselves in a shared live-port counter so
//! tests can assert nothing leaked.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::host::{AudioHost, AudioPort, HostError, HostResult, ResourceId};
use crate::stream::Direction;

pub(crate) struct MockHost {
    count: i32,
    outputs: Vec<ResourceId>,
    inputs: Vec<ResourceId>,
    channels: HashMap<ResourceId, u16>,
    rate_ranges: HashMap<ResourceId, (u32, u32)>,
    max_negotiable_channels: u16,
    fail_count: Option<String>,
    fail_output_query: Option<String>,
    fail_input_query: Option<String>,
    fail_channels: HashMap<ResourceId, String>,
    fail_rates: HashMap<ResourceId, String>,
    fail_open_port: Option<String>,
    fail_set_rate: Option<String>,
    live_ports: Arc<AtomicUsize>,
}

impl MockHost {
    /// A service reporting no devices at all.
    pub fn empty() -> Self {
        Self {
            count: 0,
            outputs: Vec::new(),
            inputs: Vec::new(),
            channels: HashMap::new(),
            rate_ranges: HashMap::new(),
            max_negotiable_channels: 2,
            fail_count: None,
            fail_output_query: None,
            fail_input_query: None,
            fail_channels: HashMap::new(),
            fail_rates: HashMap::new(),
            fail_open_port: None,
            fail_set_rate: None,
            live_ports: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// One stereo output resource (id 1) and one stereo input resource
    /// (id 2), both ranging 8 kHz to 48 kHz.
    pub fn duplex() -> Self {
        let mut host = Self::empty();
        host.count = 2;
        host.outputs = vec![1];
        host.inputs = vec![2];
        host.channels = HashMap::from([(1, 2), (2, 2)]);
        host.rate_ranges = HashMap::from([(1, (8000, 48000)), (2, (8000, 48000))]);
        host
    }

    pub fn fail_count(mut self, reason: &str) -> Self {
        self.fail_count = Some(reason.into());
        self
    }

    pub fn fail_output_query(mut self, reason: &str) -> Self {
        self.fail_output_query = Some(reason.into());
        self
    }

    #[allow(dead_code)]
    pub fn fail_input_query(mut self, reason: &str) -> Self {
        self.fail_input_query = Some(reason.into());
        self
    }

    pub fn fail_channels(mut self, resource: ResourceId, reason: &str) -> Self {
        self.fail_channels.insert(resource, reason.into());
        self
    }

    pub fn fail_rates(mut self, resource: ResourceId, reason: &str) -> Self {
        self.fail_rates.insert(resource, reason.into());
        self
    }

    pub fn fail_open_port(mut self, reason: &str) -> Self {
        self.fail_open_port = Some(reason.into());
        self
    }

    pub fn fail_set_rate(mut self, reason: &str) -> Self {
        self.fail_set_rate = Some(reason.into());
        self
    }

    pub fn with_rate_range(mut self, resource: ResourceId, range: (u32, u32)) -> Self {
        self.rate_ranges.insert(resource, range);
        self
    }

    /// Counter of ports currently open against this host.
    pub fn live_ports(&self) -> Arc<AtomicUsize> {
        self.live_ports.clone()
    }
}

impl AudioHost for MockHost {
    fn device_count(&self) -> HostResult<i32> {
        match &self.fail_count {
            Some(reason) => Err(HostError::new(reason.clone())),
            None => Ok(self.count),
        }
    }

    fn output_resources(&self, limit: usize) -> HostResult<Vec<ResourceId>> {
        match &self.fail_output_query {
            Some(reason) => Err(HostError::new(reason.clone())),
            None => Ok(self.outputs.iter().copied().take(limit).collect()),
        }
    }

    fn input_resources(&self, limit: usize) -> HostResult<Vec<ResourceId>> {
        match &self.fail_input_query {
            Some(reason) => Err(HostError::new(reason.clone())),
            None => Ok(self.inputs.iter().copied().take(limit).collect()),
        }
    }

    fn channel_count(&self, resource: ResourceId) -> HostResult<u16> {
        if let Some(reason) = self.fail_channels.get(&resource) {
            return Err(HostError::new(reason.clone()));
        }
        self.channels
            .get(&resource)
            .copied()
            .ok_or_else(|| HostError::new(format!("unknown resource {}", resource)))
    }

    fn rate_range(&self, resource: ResourceId) -> HostResult<(u32, u32)> {
        if let Some(reason) = self.fail_rates.get(&resource) {
            return Err(HostError::new(reason.clone()));
        }
        self.rate_ranges
            .get(&resource)
            .copied()
            .ok_or_else(|| HostError::new(format!("unknown resource {}", resource)))
    }

    fn default_resource(&self, direction: Direction) -> HostResult<ResourceId> {
        let resource = match direction {
            Direction::Output => self.outputs.first(),
            Direction::Input => self.inputs.first(),
        };
        resource
            .copied()
            .ok_or_else(|| HostError::new(format!("no {} resource configured", direction)))
    }

    fn negotiate_channels(&self, _resource: ResourceId, channels: u16) -> HostResult<()> {
        if channels > self.max_negotiable_channels {
            return Err(HostError::new(format!(
                "at most {} channels supported",
                self.max_negotiable_channels
            )));
        }
        Ok(())
    }

    fn open_port(
        &self,
        _resource: ResourceId,
        _direction: Direction,
        _channels: u16,
        _buffer_frames: u32,
    ) -> HostResult<Box<dyn AudioPort>> {
        if let Some(reason) = &self.fail_open_port {
            return Err(HostError::new(reason.clone()));
        }
        self.live_ports.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPort {
            live_ports: Some(self.live_ports.clone()),
            io_calls: Arc::new(AtomicUsize::new(0)),
        }))
    }

    fn set_rate(&self, _resource: ResourceId, _rate: u32) -> HostResult<()> {
        match &self.fail_set_rate {
            Some(reason) => Err(HostError::new(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Port that always transfers the requested frames and counts I/O calls.
pub(crate) struct MockPort {
    live_ports: Option<Arc<AtomicUsize>>,
    io_calls: Arc<AtomicUsize>,
}

impl MockPort {
    /// Standalone port not tied to a host, for stream-level tests.
    /// The returned counter tracks platform transfer calls.
    pub fn counting() -> (Self, Arc<AtomicUsize>) {
        let io_calls = Arc::new(AtomicUsize::new(0));
        let port = Self {
            live_ports: None,
            io_calls: io_calls.clone(),
        };
        (port, io_calls)
    }
}

impl AudioPort for MockPort {
    fn write_frames(&mut self, _interleaved: &[f32], frames: usize) -> HostResult<usize> {
        self.io_calls.fetch_add(1, Ordering::SeqCst);
        Ok(frames)
    }

    fn read_frames(&mut self, interleaved: &mut [f32], frames: usize) -> HostResult<usize> {
        self.io_calls.fetch_add(1, Ordering::SeqCst);
        interleaved.fill(0.25);
        Ok(frames)
    }
}

impl Drop for MockPort {
    fn drop(&mut self) {
        if let Some(counter) = &self.live_ports {
            counter.fetch_sub(1, Ordering::SeqCst);
        }
    }
}
