//! Headless controller for the rhythm composer.
//!
//! Owns the [`Sequencer`] on the caller's thread and a render thread that
//! owns the [`MixBus`]. The two share nothing but a lock-free ring of bus
//! events and the bus's frame clock:
//!
//! ```text
//!  caller thread                         render thread
//!  poll() ── tick(clock) ── events ──▶   MixBus ── frames ──▶ cpal callback
//!     ▲                                     │
//!     └──────────── frame clock ◀───────────┘
//! ```

mod config;
mod error;
mod offline;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rc_audio::{AudioOutput, CpalOutput};
use rc_engine::{load_factory_bank, BusEvent, BusSink, MixBus, VoicePool};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};

// Re-export common types so callers don't need rc-engine directly.
pub use config::EngineConfig;
pub use error::ControllerError;
pub use offline::render_queue;
pub use rc_engine::{DisplayState, Fact, Frame, Notification, Sequencer, Transport};
pub use rc_formats::FormatError;

/// Bus events in flight between the threads.
const EVENT_RING: usize = 1024;
/// Frames rendered per pass on the render thread.
const RENDER_BLOCK: usize = 64;

/// Headless drum machine: the sequencer plus an optional live output.
pub struct Controller {
    config: EngineConfig,
    sequencer: Sequencer,
    audio: Option<AudioHandle>,
}

struct AudioHandle {
    stop_signal: Arc<AtomicBool>,
    /// Frames rendered by the bus
    clock: Arc<AtomicU64>,
    events: HeapProd<BusEvent>,
    sample_rate: u32,
    thread: Option<JoinHandle<()>>,
}

impl AudioHandle {
    fn now(&self) -> f64 {
        self.clock.load(Ordering::Acquire) as f64 / self.sample_rate as f64
    }
}

/// Feeds the render thread. Events that don't fit are dropped.
struct RingSink<'a>(&'a mut HeapProd<BusEvent>);

impl BusSink for RingSink<'_> {
    fn submit(&mut self, event: BusEvent) -> bool {
        self.0.try_push(event).is_ok()
    }
}

impl Controller {
    pub fn new(config: EngineConfig) -> Self {
        let sequencer = Sequencer::new(config.sample_rate)
            .with_lookahead(config.lookahead())
            .with_variants(config.variants.clone());
        Self { config, sequencer, audio: None }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Editing surface.
    pub fn sequencer_mut(&mut self) -> &mut Sequencer {
        &mut self.sequencer
    }

    pub fn display(&self) -> DisplayState {
        self.sequencer.display()
    }

    /// Voice pool with every variant loaded: factory renderings, then any
    /// assets from the configured sample directory on top.
    pub fn build_pool(config: &EngineConfig, sample_rate: u32) -> VoicePool {
        let mut pool = VoicePool::new(config.max_voices, sample_rate);
        load_factory_bank(&mut pool, &config.variants);
        if let Some(dir) = &config.sample_dir {
            rc_formats::load_sample_dir(dir, &mut pool, &config.variants);
        }
        pool
    }

    // --- Presets ---

    /// Load a JSON preset. A rejected file leaves everything as it was and
    /// posts a notice.
    pub fn load_preset(&mut self, path: &Path) -> Result<(), ControllerError> {
        let snapshot = match rc_formats::load_snapshot(path) {
            Ok(s) => s,
            Err(e) => {
                self.sequencer.notice(format!("preset not loaded: {}", e));
                return Err(e.into());
            }
        };
        self.sequencer.restore(&snapshot)?;
        Ok(())
    }

    pub fn save_preset(&self, path: &Path) -> Result<(), ControllerError> {
        rc_formats::save_snapshot(path, &self.sequencer.snapshot())?;
        Ok(())
    }

    // --- Real-time playback ---

    /// Open the output device and start the render thread.
    pub fn open_audio(&mut self) -> Result<(), ControllerError> {
        if self.audio.is_some() {
            return Ok(());
        }

        let (events, consumer) = HeapRb::<BusEvent>::new(EVENT_RING).split();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let clock = Arc::new(AtomicU64::new(0));
        let (ready_tx, ready_rx) = mpsc::channel();

        let config = self.config.clone();
        let stop = stop_signal.clone();
        let frames = clock.clone();
        let thread = std::thread::Builder::new()
            .name("rc-render".into())
            .spawn(move || render_thread(config, consumer, stop, frames, ready_tx))
            .map_err(|e| ControllerError::Io(e.to_string()))?;

        let sample_rate = match ready_rx.recv() {
            Ok(Ok(rate)) => rate,
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e.into());
            }
            Err(_) => return Err(ControllerError::AudioThread),
        };
        if sample_rate != self.config.sample_rate {
            tracing::info!(requested = self.config.sample_rate, actual = sample_rate, "device rate differs");
        }
        self.sequencer.set_sample_rate(sample_rate);

        self.audio = Some(AudioHandle { stop_signal, clock, events, sample_rate, thread: Some(thread) });
        Ok(())
    }

    /// Stop the render thread and release the device.
    pub fn close_audio(&mut self) {
        self.sequencer.stop();
        if let Some(mut audio) = self.audio.take() {
            audio.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = audio.thread.take() {
                let _ = handle.join();
            }
        }
    }

    /// Audio-clock time in seconds, or `None` without a live output.
    pub fn audio_time(&self) -> Option<f64> {
        self.audio.as_ref().map(AudioHandle::now)
    }

    /// Start from the top of the queue, opening the device if needed.
    pub fn play(&mut self) -> Result<(), ControllerError> {
        self.open_audio()?;
        let now = self.audio_time().unwrap_or(0.0);
        self.sequencer.start(now);
        self.poll();
        Ok(())
    }

    pub fn stop(&mut self) {
        self.sequencer.stop();
    }

    pub fn resume(&mut self) -> Result<(), ControllerError> {
        self.open_audio()?;
        let now = self.audio_time().unwrap_or(0.0);
        self.sequencer.resume(now);
        self.poll();
        Ok(())
    }

    pub fn is_playing(&self) -> bool {
        self.sequencer.transport().is_running()
    }

    /// One pass of the look-ahead loop. Call every timer interval.
    pub fn poll(&mut self) -> usize {
        let Some(audio) = self.audio.as_mut() else {
            return 0;
        };
        let now = audio.now();
        self.sequencer.tick(now, &mut RingSink(&mut audio.events))
    }

    /// Drive the host timer until the transport stops (plus `tail` so the
    /// last notes ring out) or `limit` elapses.
    pub fn run(&mut self, limit: Duration, tail: Duration) {
        let interval = Duration::from_millis(self.config.timer_interval_ms);
        let started = Instant::now();
        let mut stopped_at: Option<Instant> = None;
        while started.elapsed() < limit {
            self.poll();
            if self.is_playing() {
                stopped_at = None;
            } else if stopped_at.get_or_insert_with(Instant::now).elapsed() >= tail {
                break;
            }
            std::thread::sleep(interval);
        }
    }

    // --- Offline rendering ---

    /// Render the queue offline at the configured rate.
    pub fn render_frames(&self, max_frames: usize) -> Result<Vec<Frame>, ControllerError> {
        let sample_rate = self.config.sample_rate;
        let mut seq = Sequencer::new(sample_rate)
            .with_lookahead(self.config.lookahead())
            .with_variants(self.config.variants.clone());
        seq.restore(&self.sequencer.snapshot())?;
        seq.set_mute_solo(self.sequencer.mute_solo());

        let mut bus = MixBus::new(Self::build_pool(&self.config, sample_rate));
        Ok(offline::render_queue(&mut seq, &mut bus, max_frames))
    }

    pub fn render_to_wav(&self, max_seconds: f64) -> Result<Vec<u8>, ControllerError> {
        let sample_rate = self.config.sample_rate;
        let max_frames = (max_seconds.max(0.0) * sample_rate as f64) as usize;
        let frames = self.render_frames(max_frames)?;
        Ok(rc_formats::frames_to_wav(&frames, sample_rate))
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.close_audio();
    }
}

fn render_thread(
    config: EngineConfig,
    mut events: HeapCons<BusEvent>,
    stop_signal: Arc<AtomicBool>,
    clock: Arc<AtomicU64>,
    ready: mpsc::Sender<Result<u32, rc_audio::AudioError>>,
) {
    let opened = CpalOutput::new(Some(config.sample_rate))
        .and_then(|(mut output, consumer)| output.build_stream(consumer).map(|_| output));
    let mut output = match opened {
        Ok(output) => output,
        Err(e) => {
            tracing::error!(error = %e, "audio output unavailable");
            let _ = ready.send(Err(e));
            return;
        }
    };

    let sample_rate = output.sample_rate();
    let mut bus = MixBus::new(Controller::build_pool(&config, sample_rate));
    if ready.send(Ok(sample_rate)).is_err() {
        return;
    }
    if let Err(e) = output.start() {
        tracing::error!(error = %e, "audio start failed");
        return;
    }

    let mut block = [Frame::silence(); RENDER_BLOCK];
    while !stop_signal.load(Ordering::Relaxed) {
        while let Some(event) = events.try_pop() {
            bus.submit(event);
        }
        bus.render(&mut block);
        for frame in block {
            output.write_spin(frame);
        }
        clock.store(bus.clock(), Ordering::Release);
    }

    let _ = output.stop();
    tracing::debug!(frames = bus.clock(), dropped = bus.pending().dropped(), "render thread done");
}
