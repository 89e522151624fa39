//! Pour order sequencing.

use barmixer::app::events::AppEvent;
use barmixer::app::pour::{PourOrder, run_pour_order};
use barmixer::config::PwmConfig;

use crate::mock_hw::{MockPwm, PwmCall, RecordingDelay, RecordingSink};

fn channels_in_order(pwm: &MockPwm) -> Vec<u8> {
    let mut seen: Vec<u8> = Vec::new();
    for (ch, _) in pwm.pulses() {
        if seen.last() != Some(&ch) {
            seen.push(ch);
        }
    }
    seen
}

#[test]
fn channels_run_ascending_then_mix() {
    let cfg = PwmConfig::default();
    let order = PourOrder {
        pour_amt0: 1,
        pour_amt2: 2,
        pour_amt5: 1,
        mix: true,
        ..PourOrder::default()
    };
    let mut pwm = MockPwm::new();
    let mut sink = RecordingSink::new();

    let cycles = run_pour_order(
        &cfg,
        &mut pwm,
        &mut RecordingDelay::new(),
        &mut sink,
        &order,
    )
    .unwrap();

    assert_eq!(cycles, 5);
    assert_eq!(channels_in_order(&pwm), vec![0, 2, 5, cfg.mix_channel]);
    assert_eq!(pwm.pulses().len(), 10);
    assert_eq!(
        sink.events.first(),
        Some(&AppEvent::PourStarted {
            channels: 3,
            mix: true
        })
    );
    assert_eq!(sink.events.last(), Some(&AppEvent::PourFinished));
}

#[test]
fn frequency_is_set_once_up_front() {
    let json = r#"{"pourAmt1":1,"pourAmt3":1}"#;
    let order = PourOrder::from_json(json).unwrap();
    let mut pwm = MockPwm::new();

    run_pour_order(
        &PwmConfig::default(),
        &mut pwm,
        &mut RecordingDelay::new(),
        &mut RecordingSink::new(),
        &order,
    )
    .unwrap();

    let freq_calls = pwm
        .calls
        .iter()
        .filter(|c| matches!(c, PwmCall::Frequency(_)))
        .count();
    assert_eq!(freq_calls, 1);
    assert!(matches!(pwm.calls[0], PwmCall::Frequency(60)));
}

#[test]
fn no_mix_when_flag_clear() {
    let cfg = PwmConfig::default();
    let order = PourOrder {
        pour_amt4: 2,
        ..PourOrder::default()
    };
    let mut pwm = MockPwm::new();

    let cycles = run_pour_order(
        &cfg,
        &mut pwm,
        &mut RecordingDelay::new(),
        &mut RecordingSink::new(),
        &order,
    )
    .unwrap();

    assert_eq!(cycles, 2);
    assert!(pwm.pulses().iter().all(|&(ch, _)| ch == 4));
}

#[test]
fn empty_order_moves_nothing() {
    let mut pwm = MockPwm::new();
    let mut delay = RecordingDelay::new();

    let cycles = run_pour_order(
        &PwmConfig::default(),
        &mut pwm,
        &mut delay,
        &mut RecordingSink::new(),
        &PourOrder::default(),
    )
    .unwrap();

    assert_eq!(cycles, 0);
    assert!(pwm.pulses().is_empty());
    assert!(delay.delays_ms.is_empty());
}
