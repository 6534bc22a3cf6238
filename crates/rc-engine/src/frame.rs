//! Audio frame type.

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Quantize a float sample in -1.0..=1.0 to a mono frame.
    pub fn from_f32(value: f32) -> Self {
        let scaled = (value * 32767.0).clamp(-32768.0, 32767.0);
        Self::mono(scaled as i16)
    }

    /// Mix another frame into this one.
    pub fn mix(&mut self, other: Frame) {
        // Use i32 to avoid overflow, then clamp
        let left = (self.left as i32 + other.left as i32).clamp(-32768, 32767);
        let right = (self.right as i32 + other.right as i32).clamp(-32768, 32767);
        self.left = left as i16;
        self.right = right as i16;
    }

    /// Peak absolute value across both channels.
    pub fn peak(&self) -> u16 {
        self.left.unsigned_abs().max(self.right.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_f32_clamps() {
        assert_eq!(Frame::from_f32(2.0), Frame::mono(32767));
        assert_eq!(Frame::from_f32(-2.0), Frame::mono(-32768));
        assert_eq!(Frame::from_f32(0.0), Frame::silence());
    }

    #[test]
    fn mix_saturates() {
        let mut f = Frame::mono(30000);
        f.mix(Frame::mono(10000));
        assert_eq!(f, Frame::mono(32767));
        assert_eq!(f.peak(), 32767);
    }
}
