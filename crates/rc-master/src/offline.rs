//! Offline rendering.
//!
//! Simulates the host timer against the rendered-frame clock: the
//! look-ahead loop runs once every timer interval of audio, exactly as it
//! would live, so an offline render is sample-identical from run to run.

use rc_engine::{Frame, MixBus, Sequencer};

/// Play the queue from the top into `bus`, returning up to `max_frames`
/// frames. Rendering ends early once the transport has stopped and every
/// voice has died away.
pub fn render_queue(seq: &mut Sequencer, bus: &mut MixBus, max_frames: usize) -> Vec<Frame> {
    let interval = ((seq.lookahead().interval_s * bus.sample_rate() as f64).round() as usize).max(1);
    let mut frames = Vec::with_capacity(max_frames);
    let mut block = vec![Frame::silence(); interval];

    seq.set_sample_rate(bus.sample_rate());
    seq.start(bus.now());
    while frames.len() < max_frames {
        if seq.transport().is_running() {
            seq.tick(bus.now(), bus);
        } else if bus.pending().is_empty() && bus.pool().active_count() == 0 {
            break;
        }
        let n = interval.min(max_frames - frames.len());
        bus.render(&mut block[..n]);
        frames.extend_from_slice(&block[..n]);
    }
    tracing::debug!(frames = frames.len(), dropped = bus.pending().dropped(), "offline render done");
    frames
}
