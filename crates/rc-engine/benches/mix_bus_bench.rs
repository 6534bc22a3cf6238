use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rc_engine::{load_factory_bank, Frame, MixBus, Sequencer, VariantTable, VoicePool};
use rc_ir::{Accent, Instrument, PatternAddress};

const SR: u32 = 44_100;

fn busy_sequencer() -> Sequencer {
    let mut seq = Sequencer::new(SR);
    let a = PatternAddress::default();
    seq.set_recording(true);
    seq.set_cycle(true);
    for i in 0..16 {
        seq.write_step(a, Instrument::ClosedHat, i, Some(Accent::Normal));
        if i % 4 == 0 {
            seq.write_step(a, Instrument::BassDrum, i, Some(Accent::Strong));
        }
        if i % 8 == 4 {
            seq.write_step(a, Instrument::SnareDrum, i, Some(Accent::Normal));
        }
    }
    seq
}

fn bench_render(c: &mut Criterion) {
    let table = VariantTable::default();
    let mut pool = VoicePool::new(64, SR);
    load_factory_bank(&mut pool, &table);
    let mut bus = MixBus::new(pool);
    let mut seq = busy_sequencer();
    seq.start(0.0);

    let mut buf = vec![Frame::silence(); 512];
    c.bench_function("mix_bus_render_512", |b| {
        b.iter(|| {
            seq.tick(bus.now(), &mut bus);
            bus.render(black_box(&mut buf));
        })
    });
}

fn bench_tick(c: &mut Criterion) {
    let mut seq = busy_sequencer();
    let mut events = Vec::new();
    let mut now = 0.0;
    seq.start(now);
    c.bench_function("sequencer_tick", |b| {
        b.iter(|| {
            events.clear();
            now += 0.02;
            seq.tick(black_box(now), &mut events);
        })
    });
}

criterion_group!(benches, bench_render, bench_tick);
criterion_main!(benches);
