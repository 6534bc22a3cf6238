//! Preset snapshot tests: live state through JSON and back.

use rc_engine::{Fact, Notification, Sequencer};
use rc_formats::{from_json, to_json, FormatError};
use rc_ir::{Accent, Instrument, ParamId, PatternAddress, Scale, SnapshotError, Step};
use std::sync::{Arc, Mutex};

fn addr(i: usize) -> PatternAddress {
    PatternAddress::from_index(i).unwrap()
}

fn populated() -> Sequencer {
    let mut seq = Sequencer::new(44_100);
    seq.set_recording(true);
    for i in (0..16).step_by(4) {
        seq.write_step(addr(0), Instrument::BassDrum, i, Some(Accent::Strong));
    }
    seq.write_step(addr(0), Instrument::OpenHat, 14, Some(Accent::Normal));
    seq.write_step(addr(0), Instrument::TotalAccent, 0, Some(Accent::Normal));
    seq.write_step(addr(383), Instrument::Ride, 7, Some(Accent::Normal));
    seq.set_scale(addr(383), Scale::Sextuplet);
    seq.set_last_step(addr(383), 12);
    seq.set_first_step(addr(383), 3);
    seq.set_shuffle(addr(383), -0.25);
    seq.set_flam(addr(383), 0.3);
    seq.set_flam_enabled(addr(383), Instrument::OpenHat, true);
    seq.set_invert(addr(383), true);
    // Window only, no steps.
    seq.set_last_step(addr(100), 8);
    seq.queue_append(addr(383));
    seq.queue_append(addr(100));
    seq.set_param(ParamId::Tempo, 0.75);
    seq.set_param(ParamId::SdSnappy, 0.1);
    seq.set_cycle(true);
    seq
}

#[test]
fn json_round_trip_restores_everything() {
    let source = populated();
    let text = to_json(&source.snapshot()).unwrap();

    let mut target = Sequencer::new(44_100);
    target.restore(&from_json(&text).unwrap()).unwrap();

    for i in 0..rc_ir::MEMORY_SIZE {
        assert_eq!(target.memory().read(addr(i)), source.memory().read(addr(i)), "pattern {}", i);
    }
    assert_eq!(target.queue().entries(), &[addr(0), addr(383), addr(100)]);
    assert_eq!(target.params(), source.params());
    assert!(target.cycle());
    assert_eq!(target.snapshot(), source.snapshot());
}

#[test]
fn only_populated_patterns_are_stored() {
    let snapshot = populated().snapshot();
    assert_eq!(snapshot.patterns.keys().copied().collect::<Vec<_>>(), vec![0, 100, 383]);
    assert!(snapshot.patterns[&100].steps.iter().flatten().all(|&code| code == 0));
}

#[test]
fn absent_patterns_and_params_take_defaults() {
    let text = r#"{
        "version": 1,
        "patterns": {
            "5": {
                "steps": [[2,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0],[],[],[],[],[],[],[],[],[],[]],
                "scale": 1, "base": 16, "first": 0,
                "shuffle": 0.0, "flam": 0.0,
                "flam_lanes": [0,0,0,0,0,0,0,0,0,0,0],
                "invert": false
            }
        },
        "queue": [5],
        "params": { "tempo": 0.5, "no_such_knob": 0.3 }
    }"#;
    // Lanes must carry sixteen steps each.
    assert!(matches!(
        from_json(text),
        Err(FormatError::Structure(SnapshotError::StepCount { index: 5, lane: 1, found: 0 }))
    ));

    let sixteen = format!("[{}]", vec!["0"; 16].join(","));
    let text = text.replace("[]", &sixteen);
    let snapshot = from_json(&text).unwrap();
    let mut seq = Sequencer::new(44_100);
    seq.restore(&snapshot).unwrap();

    assert_ne!(seq.memory().read(addr(5)).step(Instrument::BassDrum.lane(), 0), Step::Off);
    assert_eq!(seq.memory().read(addr(6)), &rc_ir::PatternRecord::new());
    assert_eq!(seq.params().raw(ParamId::Tempo), 0.5);
    assert_eq!(seq.params().raw(ParamId::BdLevel), rc_ir::ParamTable::factory().raw(ParamId::BdLevel));
    assert!(!seq.cycle());
}

#[test]
fn rejected_snapshot_leaves_state_and_posts_notice() {
    let mut seq = populated();
    let before = seq.snapshot();
    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = notices.clone();
    seq.subscribe(Fact::Notice, move |n| {
        if let Notification::Notice(msg) = n {
            sink.lock().unwrap().push(msg.clone());
        }
    });

    let mut bad = before.clone();
    bad.queue = vec![384];
    assert_eq!(seq.restore(&bad), Err(SnapshotError::QueueIndex(384)));
    assert_eq!(seq.snapshot(), before);
    assert_eq!(notices.lock().unwrap().len(), 1);
    assert!(notices.lock().unwrap()[0].starts_with("preset not loaded"));
}

#[test]
fn malformed_json_is_reported() {
    assert!(matches!(from_json("{ not json"), Err(FormatError::Json(_))));
    assert!(matches!(
        from_json(r#"{"version": 9, "patterns": {}, "queue": [0], "params": {}}"#),
        Err(FormatError::Structure(SnapshotError::UnsupportedVersion(9)))
    ));
}
