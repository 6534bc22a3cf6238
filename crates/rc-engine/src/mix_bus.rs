//! Mix bus and gain control.
//!
//! Every voice sums into one mono node, then:
//! 1. adaptive gain compensation: when the gain scheduled for a step adds up
//!    to more than unity, the bus gain glides toward `-20·log10(sum)` dB and
//!    relaxes back to 0 dB once a step stays below unity;
//! 2. a soft saturator whose drive tracks the master volume;
//! 3. a DC-blocking high-pass.
//!
//! The bus owns the audio clock: its frame counter is the time base every
//! scheduled event is stamped against.

use crate::event_queue::{BusEvent, BusPayload, BusSink, EventQueue};
use crate::filter::OnePole;
use crate::frame::Frame;
use crate::voice_pool::VoicePool;

/// Time constant of the compensation glide (s).
pub const COMPENSATION_SMOOTHING_S: f32 = 0.015;
/// Saturator drive at full master volume.
pub const MAX_DRIVE: f32 = 0.6;
/// Cutoff of the DC-blocking stage (Hz).
pub const DC_CUTOFF_HZ: f32 = 20.0;

/// The shared output path.
pub struct MixBus {
    pool: VoicePool,
    pending: EventQueue,
    clock: u64,
    compensation_db: f32,
    target_db: f32,
    glide: f32,
    drive: f32,
    dc_block: OnePole,
}

impl MixBus {
    pub fn new(pool: VoicePool) -> Self {
        let sr = pool.output_rate();
        Self {
            glide: 1.0 - libm::expf(-1.0 / (COMPENSATION_SMOOTHING_S * sr as f32)),
            dc_block: OnePole::high_pass(DC_CUTOFF_HZ, sr),
            pool,
            pending: EventQueue::new(),
            clock: 0,
            compensation_db: 0.0,
            target_db: 0.0,
            drive: 0.0,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.pool.output_rate()
    }

    /// Frames rendered so far.
    pub fn clock(&self) -> u64 {
        self.clock
    }

    /// Audio-clock time in seconds.
    pub fn now(&self) -> f64 {
        self.clock as f64 / self.pool.output_rate() as f64
    }

    pub fn pool(&self) -> &VoicePool {
        &self.pool
    }

    pub fn pending(&self) -> &EventQueue {
        &self.pending
    }

    /// Current compensation gain in dB (0 or negative).
    pub fn compensation_db(&self) -> f32 {
        self.compensation_db
    }

    /// Drop pending events and silence every voice.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.pool.kill_all();
        self.compensation_db = 0.0;
        self.target_db = 0.0;
        self.dc_block.reset();
    }

    fn apply(&mut self, event: BusEvent) {
        match event.payload {
            BusPayload::Note(note) => {
                self.pool.start(&note);
            }
            BusPayload::StepMix { gain_sum, master } => {
                self.target_db = compensation_target_db(gain_sum);
                self.drive = MAX_DRIVE * master.clamp(0.0, 1.0);
            }
        }
    }

    /// Render one frame.
    pub fn render_frame(&mut self) -> Frame {
        while let Some(event) = self.pending.pop_due(self.clock) {
            self.apply(event);
        }

        let sum = self.pool.render_all();

        self.compensation_db += (self.target_db - self.compensation_db) * self.glide;
        let compensated = sum * db_to_gain(self.compensation_db);
        let shaped = saturate(compensated, self.drive);
        let out = self.dc_block.process(shaped);

        self.clock += 1;
        if self.clock % 256 == 0 {
            self.pool.reap_finished();
        }
        Frame::from_f32(out)
    }

    /// Render into a buffer.
    pub fn render(&mut self, out: &mut [Frame]) {
        #[cfg(feature = "alloc_check")]
        assert_no_alloc::assert_no_alloc(|| self.render_into(out));
        #[cfg(not(feature = "alloc_check"))]
        self.render_into(out);
    }

    fn render_into(&mut self, out: &mut [Frame]) {
        for frame in out.iter_mut() {
            *frame = self.render_frame();
        }
    }
}

impl BusSink for MixBus {
    fn submit(&mut self, event: BusEvent) -> bool {
        self.pending.push(event)
    }
}

/// Compensation the bus glides toward for a step's summed gain.
pub fn compensation_target_db(gain_sum: f32) -> f32 {
    if gain_sum > 1.0 {
        -20.0 * libm::log10f(gain_sum)
    } else {
        0.0
    }
}

pub fn db_to_gain(db: f32) -> f32 {
    libm::powf(10.0, db / 20.0)
}

/// `x(1+k) / (1+k|x|)`: unity at ±1, gentle compression in between.
pub fn saturate(x: f32, drive: f32) -> f32 {
    x * (1.0 + drive) / (1.0 + drive * x.abs())
}
