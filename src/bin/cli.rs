//! rc-cli: headless playback and WAV export.
//!
//! Usage:
//!   rc-cli                          # play the built-in demo beat
//!   rc-cli --preset kit.json        # play a saved preset
//!   rc-cli --wav out.wav            # render offline instead of playing
//!   RUST_LOG=rc_engine=debug rc-cli # transport and pattern-change logs

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use rc_ir::{Accent, Instrument, ParamId, PatternAddress};
use rc_master::{Controller, EngineConfig, Sequencer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rc-cli", about = "Rhythm composer: play or render a preset")]
struct Args {
    /// JSON preset to load (defaults to a demo beat)
    #[arg(long)]
    preset: Option<PathBuf>,

    /// TOML engine configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Render offline to this WAV file instead of playing
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Longest render or playback, in seconds
    #[arg(long, default_value_t = 30.0)]
    seconds: f64,

    /// Loop the queue instead of stopping after one pass
    #[arg(long)]
    cycle: bool,

    /// Tempo override in BPM
    #[arg(long)]
    tempo: Option<f32>,

    /// Write the loaded preset (or demo) to this JSON file
    #[arg(long)]
    save_preset: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let mut ctrl = Controller::new(config);

    match &args.preset {
        Some(path) => ctrl.load_preset(path).with_context(|| format!("loading {}", path.display()))?,
        None => demo_beat(ctrl.sequencer_mut()),
    }
    let seq = ctrl.sequencer_mut();
    if args.cycle {
        seq.set_cycle(true);
    }
    if let Some(bpm) = args.tempo {
        seq.set_param(ParamId::Tempo, ParamId::Tempo.spec().raw_of(bpm));
    }

    if let Some(path) = &args.save_preset {
        ctrl.save_preset(path).with_context(|| format!("saving {}", path.display()))?;
    }

    let d = ctrl.display();
    println!("Pattern:  {}", d.pattern_number);
    println!("Queue:    {} entries", d.queue_len);
    println!("Tempo:    {:.1} BPM", d.bpm);
    println!("Cycle:    {}", if d.cycle { "on" } else { "off" });
    println!();

    match &args.wav {
        Some(path) => render_to_wav(&ctrl, path, args.seconds),
        None => play_audio(&mut ctrl, args.seconds),
    }
}

fn play_audio(ctrl: &mut Controller, seconds: f64) -> Result<()> {
    ctrl.play().context("starting audio")?;
    println!("Playing...");

    let interval = Duration::from_millis(ctrl.config().timer_interval_ms);
    let limit = Duration::from_secs_f64(seconds.max(0.0));
    let started = std::time::Instant::now();
    while ctrl.is_playing() && started.elapsed() < limit {
        ctrl.poll();
        let d = ctrl.display();
        if let Some(step) = d.beat_position {
            print!("\rPat: {:02} | Queue: {:>3}/{:<3} | Step: {:02}", d.pattern_number, d.queue_cursor + 1, d.queue_len, step + 1);
            let _ = std::io::stdout().flush();
        }
        std::thread::sleep(interval);
    }
    ctrl.stop();
    // Let the last notes ring out.
    ctrl.run(Duration::from_secs(2), Duration::from_millis(1500));
    ctrl.close_audio();

    println!("\rDone.                                   ");
    Ok(())
}

fn render_to_wav(ctrl: &Controller, path: &Path, seconds: f64) -> Result<()> {
    println!("Rendering to {} at {} Hz...", path.display(), ctrl.config().sample_rate);
    let wav = ctrl.render_to_wav(seconds)?;
    println!("Rendered {} bytes", wav.len());
    std::fs::write(path, &wav).with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = wav.len(), "wav written");
    println!("Done.");
    Ok(())
}

/// Two patterns: a groove and a tom fill.
fn demo_beat(seq: &mut Sequencer) {
    let groove = PatternAddress::default();
    let fill = PatternAddress::from_index(1).unwrap_or(groove);
    seq.set_recording(true);

    for pattern in [groove, fill] {
        for i in 0..16 {
            let accent = if i % 4 == 0 { Accent::Strong } else { Accent::Normal };
            if i % 2 == 0 {
                seq.write_step(pattern, Instrument::ClosedHat, i, Some(accent));
            }
            if i % 4 == 0 {
                seq.write_step(pattern, Instrument::BassDrum, i, Some(Accent::Strong));
            }
        }
        seq.write_step(pattern, Instrument::SnareDrum, 4, Some(Accent::Normal));
        seq.write_step(pattern, Instrument::SnareDrum, 12, Some(Accent::Strong));
        seq.write_step(pattern, Instrument::HandClap, 12, Some(Accent::Normal));
        seq.set_flam(pattern, 0.05);
        seq.set_flam_enabled(pattern, Instrument::SnareDrum, true);
        seq.set_shuffle(pattern, 0.12);
    }

    seq.write_step(groove, Instrument::OpenHat, 14, Some(Accent::Normal));
    seq.write_step(groove, Instrument::RimShot, 7, Some(Accent::Normal));
    for (i, tom) in [(12, Instrument::HighTom), (13, Instrument::MidTom), (14, Instrument::MidTom), (15, Instrument::LowTom)] {
        seq.write_step(fill, tom, i, Some(Accent::Strong));
    }
    seq.write_step(fill, Instrument::Crash, 0, Some(Accent::Strong));
    seq.write_step(fill, Instrument::TotalAccent, 15, Some(Accent::Normal));

    seq.set_recording(false);
    seq.queue_append(fill);
}
