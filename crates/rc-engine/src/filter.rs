//! One-pole RC filters.
//!
//! `y = y_prev + alpha * (x - y_prev)` for the low-pass; the high-pass is
//! the input minus that low-passed signal.

use core::f32::consts::TAU;

/// Filter response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterKind {
    LowPass,
    HighPass,
}

/// Filter settings carried on a note.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub cutoff_hz: f32,
}

/// One-pole filter state.
#[derive(Clone, Copy, Debug)]
pub struct OnePole {
    kind: FilterKind,
    alpha: f32,
    prev: f32,
}

impl OnePole {
    pub fn new(spec: FilterSpec, sample_rate: u32) -> Self {
        let nyquist = sample_rate as f32 * 0.5;
        let cutoff = spec.cutoff_hz.clamp(1.0, nyquist);
        Self {
            kind: spec.kind,
            alpha: 1.0 - libm::expf(-TAU * cutoff / sample_rate as f32),
            prev: 0.0,
        }
    }

    pub fn low_pass(cutoff_hz: f32, sample_rate: u32) -> Self {
        Self::new(FilterSpec { kind: FilterKind::LowPass, cutoff_hz }, sample_rate)
    }

    pub fn high_pass(cutoff_hz: f32, sample_rate: u32) -> Self {
        Self::new(FilterSpec { kind: FilterKind::HighPass, cutoff_hz }, sample_rate)
    }

    #[inline]
    pub fn process(&mut self, x: f32) -> f32 {
        self.prev += self.alpha * (x - self.prev);
        match self.kind {
            FilterKind::LowPass => self.prev,
            FilterKind::HighPass => x - self.prev,
        }
    }

    pub fn reset(&mut self) {
        self.prev = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn energy(filter: &mut OnePole, input: impl Iterator<Item = f32>) -> f32 {
        input.map(|x| filter.process(x)).map(|y| y * y).sum()
    }

    fn square(n: usize) -> impl Iterator<Item = f32> {
        (0..n).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 })
    }

    #[test]
    fn low_pass_attenuates_nyquist() {
        let mut f = OnePole::low_pass(1000.0, 44100);
        let out = energy(&mut f, square(1000));
        assert!(out < 1000.0 * 0.05, "energy {}", out);
    }

    #[test]
    fn high_pass_removes_dc() {
        let mut f = OnePole::high_pass(20.0, 44100);
        let mut last = 1.0;
        for _ in 0..44100 {
            last = f.process(0.5);
        }
        assert!(last.abs() < 1e-3, "residual {}", last);
    }

    #[test]
    fn low_pass_settles_on_dc() {
        let mut f = OnePole::low_pass(5000.0, 44100);
        let mut last = 0.0;
        for _ in 0..1000 {
            last = f.process(1.0);
        }
        assert!((last - 1.0).abs() < 1e-4);
        f.reset();
        assert_eq!(f.process(0.0), 0.0);
    }
}
