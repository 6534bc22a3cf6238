//! Sample data types.

use alloc::string::String;
use alloc::vec::Vec;

slotmap::new_key_type! {
    /// Key for referencing a sample variant in the voice bank.
    pub struct SampleKey;
}

/// One pre-rendered sample variant.
#[derive(Clone, Debug)]
pub struct Sample {
    /// Variant name, e.g. `bd_7`
    pub name: String,
    /// Audio data (always mono; the bus is mono)
    pub data: SampleData,
    /// Rate the data was recorded at
    pub sample_rate: u32,
}

impl Sample {
    pub fn new(name: &str, data: SampleData, sample_rate: u32) -> Self {
        Self { name: String::from(name), data, sample_rate }
    }

    /// Get the length of the sample in frames.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the sample has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Mono sample audio data.
#[derive(Clone, Debug)]
pub enum SampleData {
    Mono8(Vec<i8>),
    Mono16(Vec<i16>),
}

impl SampleData {
    /// Get the number of sample frames.
    pub fn len(&self) -> usize {
        match self {
            SampleData::Mono8(v) => v.len(),
            SampleData::Mono16(v) => v.len(),
        }
    }

    /// Returns true if empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample value at `pos` as i16, zero past the end.
    pub fn get_mono(&self, pos: usize) -> i16 {
        match self {
            SampleData::Mono8(v) => v.get(pos).copied().unwrap_or(0) as i16 * 256,
            SampleData::Mono16(v) => v.get(pos).copied().unwrap_or(0),
        }
    }

    /// Get a linearly interpolated sample value.
    ///
    /// `pos_fixed` is a 16.16 fixed-point position. Blends between the two
    /// nearest sample values using the fractional part.
    pub fn get_mono_interpolated(&self, pos_fixed: u64) -> i16 {
        let idx = (pos_fixed >> 16) as usize;
        let frac = (pos_fixed & 0xFFFF) as i64;

        let a = self.get_mono(idx) as i64;
        let b = self.get_mono(idx + 1) as i64;

        (a + (((b - a) * frac) >> 16)) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolated_at_integer_matches_nearest() {
        let data = SampleData::Mono8(alloc::vec![0, 100, -50, 30]);
        assert_eq!(data.get_mono_interpolated(1 << 16), data.get_mono(1));
    }

    #[test]
    fn interpolated_midpoint_averages_neighbors() {
        let data = SampleData::Mono16(alloc::vec![0, 1000]);
        let mid = data.get_mono_interpolated(32768);
        assert!((mid as i32 - 500).abs() <= 1);
    }

    #[test]
    fn interpolated_past_end_fades_to_zero() {
        let data = SampleData::Mono8(alloc::vec![100]);
        let val = data.get_mono_interpolated(32768);
        assert!((val as i32 - 12800).abs() <= 1);
        assert_eq!(data.get_mono_interpolated(5 << 16), 0);
    }
}
