//! Device capability model
//!
//! Devices are discovered once per [`AudioSystem`](crate::AudioSystem)
//! initialization and are immutable afterwards. Capability data is cached
//! in the table; callers receive owned [`DeviceInfo`] snapshots.

use serde::{Deserialize, Serialize};

use crate::host::ResourceId;

/// Candidate sample rates checked against each device's reported range.
///
/// A device's supported-rate list is this list filtered to the inclusive
/// `[min, max]` range the device reports, ascending.
pub const CANONICAL_SAMPLE_RATES: [u32; 14] = [
    4000, 5512, 8000, 9600, 11025, 16000, 22050, 32000, 44100, 48000, 88200, 96000, 176400, 192000,
];

/// Filter the canonical candidate list to an inclusive rate range.
pub fn supported_rates_in(min: u32, max: u32) -> Vec<u32> {
    CANONICAL_SAMPLE_RATES
        .iter()
        .copied()
        .filter(|&rate| rate >= min && rate <= max)
        .collect()
}

/// A sample encoding a device can produce or consume natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleFormat {
    /// 8-bit signed integer
    S8,
    /// 16-bit signed integer
    S16,
    /// 24-bit signed integer
    S24,
    /// 32-bit signed integer
    S32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl SampleFormat {
    pub const ALL: [SampleFormat; 6] = [
        SampleFormat::S8,
        SampleFormat::S16,
        SampleFormat::S24,
        SampleFormat::S32,
        SampleFormat::F32,
        SampleFormat::F64,
    ];

    const fn bit(self) -> u8 {
        match self {
            SampleFormat::S8 => 0x01,
            SampleFormat::S16 => 0x02,
            SampleFormat::S24 => 0x04,
            SampleFormat::S32 => 0x08,
            SampleFormat::F32 => 0x10,
            SampleFormat::F64 => 0x20,
        }
    }

    /// Human-readable description, e.g. `"16-bit signed integer"`.
    pub fn description(self) -> &'static str {
        match self {
            SampleFormat::S8 => "8-bit signed integer",
            SampleFormat::S16 => "16-bit signed integer",
            SampleFormat::S24 => "24-bit signed integer",
            SampleFormat::S32 => "32-bit signed integer",
            SampleFormat::F32 => "32-bit float",
            SampleFormat::F64 => "64-bit float",
        }
    }
}

/// Set of sample formats a device advertises simultaneously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormatSet(u8);

impl FormatSet {
    /// The fixed set advertised for every probed resource: all signed
    /// integer widths except 32-bit, plus both float widths.
    pub const NATIVE: FormatSet = FormatSet(
        SampleFormat::S8.bit()
            | SampleFormat::S16.bit()
            | SampleFormat::S24.bit()
            | SampleFormat::F32.bit()
            | SampleFormat::F64.bit(),
    );

    pub const fn empty() -> Self {
        FormatSet(0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, format: SampleFormat) -> bool {
        self.0 & format.bit() != 0
    }

    pub fn insert(&mut self, format: SampleFormat) {
        self.0 |= format.bit();
    }

    /// Formats in this set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = SampleFormat> {
        SampleFormat::ALL.into_iter().filter(move |f| self.contains(*f))
    }
}

impl FromIterator<SampleFormat> for FormatSet {
    fn from_iter<T: IntoIterator<Item = SampleFormat>>(iter: T) -> Self {
        let mut set = FormatSet::empty();
        for format in iter {
            set.insert(format);
        }
        set
    }
}

/// A device table entry.
///
/// Populated per direction: a slot holding only an output resource keeps
/// its input fields zeroed, and vice versa. A slot whose capability queries
/// all failed keeps everything zeroed apart from the resource handle.
#[derive(Debug, Clone, Default)]
pub(crate) struct Device {
    pub output_resource: Option<ResourceId>,
    pub input_resource: Option<ResourceId>,
    pub max_output_channels: u16,
    pub min_output_channels: u16,
    pub max_input_channels: u16,
    pub min_input_channels: u16,
    pub sample_rates: Vec<u32>,
    pub native_formats: FormatSet,
}

impl Device {
    pub fn info(&self) -> DeviceInfo {
        DeviceInfo {
            max_output_channels: self.max_output_channels,
            min_output_channels: self.min_output_channels,
            max_input_channels: self.max_input_channels,
            min_input_channels: self.min_input_channels,
            sample_rates: self.sample_rates.clone(),
            native_formats: self.native_formats,
        }
    }
}

/// Owned snapshot of a device's capabilities.
///
/// Channel fields of an absent direction are zero. The caller owns the
/// sample-rate list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub max_output_channels: u16,
    pub min_output_channels: u16,
    pub max_input_channels: u16,
    pub min_input_channels: u16,
    /// Supported rates in Hz, ascending, filtered from the canonical list
    pub sample_rates: Vec<u32>,
    /// Sample encodings the device advertises
    pub native_formats: FormatSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_filtering_is_ascending_subset() {
        let rates = supported_rates_in(8000, 48000);
        assert_eq!(rates, vec![8000, 9600, 11025, 16000, 22050, 32000, 44100, 48000]);
    }

    #[test]
    fn test_degenerate_rate_range() {
        assert_eq!(supported_rates_in(44100, 44100), vec![44100]);
    }

    #[test]
    fn test_empty_rate_range() {
        assert!(supported_rates_in(300, 500).is_empty());
        // inverted range accepts nothing
        assert!(supported_rates_in(48000, 8000).is_empty());
    }

    #[test]
    fn test_native_format_set() {
        let set = FormatSet::NATIVE;
        assert!(set.contains(SampleFormat::S8));
        assert!(set.contains(SampleFormat::S16));
        assert!(set.contains(SampleFormat::S24));
        assert!(!set.contains(SampleFormat::S32));
        assert!(set.contains(SampleFormat::F32));
        assert!(set.contains(SampleFormat::F64));
        assert_eq!(set.iter().count(), 5);
    }

    #[test]
    fn test_format_set_collect() {
        let set: FormatSet = [SampleFormat::S16, SampleFormat::F32].into_iter().collect();
        assert!(set.contains(SampleFormat::S16));
        assert!(set.contains(SampleFormat::F32));
        assert!(!set.contains(SampleFormat::S8));
    }

    #[test]
    fn test_default_device_is_zeroed() {
        let device = Device::default();
        let info = device.info();
        assert_eq!(info.max_output_channels, 0);
        assert_eq!(info.max_input_channels, 0);
        assert!(info.sample_rates.is_empty());
        assert!(info.native_formats.is_empty());
    }
}
