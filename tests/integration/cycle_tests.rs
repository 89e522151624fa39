//! Actuator cycle runner against the recording PWM mock.

use barmixer::app::commands::{ChannelSelector, ServoChannel};
use barmixer::app::cycle::{CycleRunner, run_from_args};
use barmixer::app::events::AppEvent;
use barmixer::config::PwmConfig;
use barmixer::error::{ActuatorError, Error};

use crate::mock_hw::{MockPwm, PwmCall, RecordingDelay, RecordingSink};

fn channel(n: u8) -> ChannelSelector {
    ChannelSelector::Channel(ServoChannel::new(n).unwrap())
}

fn expected_pulses(ch: u8, n: u32, cfg: &PwmConfig) -> Vec<(u8, u16)> {
    (0..n)
        .flat_map(|_| [(ch, cfg.servo_min), (ch, cfg.servo_max)])
        .collect()
}

#[test]
fn repeats_min_max_pair_count_times() {
    let cfg = PwmConfig::default();
    let runner = CycleRunner::new(cfg.clone());

    for n in [0u32, 1, 3] {
        let mut pwm = MockPwm::new();
        let mut delay = RecordingDelay::new();
        let mut sink = RecordingSink::new();

        let done = runner
            .run(&mut pwm, &mut delay, &mut sink, channel(4), n)
            .unwrap();

        assert_eq!(done, n);
        assert_eq!(pwm.pulses(), expected_pulses(4, n, &cfg));
        assert_eq!(delay.delays_ms.len(), 2 * n as usize);
        assert_eq!(
            sink.count(|e| matches!(e, AppEvent::CycleCompleted { .. })),
            n as usize
        );
    }
}

#[test]
fn every_pulse_uses_zero_on_tick() {
    let runner = CycleRunner::new(PwmConfig::default());
    let mut pwm = MockPwm::new();
    runner
        .run(
            &mut pwm,
            &mut RecordingDelay::new(),
            &mut RecordingSink::new(),
            channel(1),
            2,
        )
        .unwrap();
    assert!(
        pwm.calls
            .iter()
            .all(|c| matches!(c, PwmCall::Pwm { on: 0, channel: 1, .. }))
    );
}

#[test]
fn holds_follow_configured_durations() {
    let cfg = PwmConfig {
        min_hold_ms: 250,
        max_hold_ms: 750,
        ..PwmConfig::default()
    };
    let runner = CycleRunner::new(cfg);
    let mut delay = RecordingDelay::new();
    runner
        .run(
            &mut MockPwm::new(),
            &mut delay,
            &mut RecordingSink::new(),
            channel(0),
            2,
        )
        .unwrap();
    assert_eq!(delay.delays_ms, vec![250, 750, 250, 750]);
}

#[test]
fn mix_runs_once_on_mix_channel() {
    let cfg = PwmConfig::default();
    let runner = CycleRunner::new(cfg.clone());
    let mut pwm = MockPwm::new();
    let mut sink = RecordingSink::new();

    let done = runner
        .run(
            &mut pwm,
            &mut RecordingDelay::new(),
            &mut sink,
            ChannelSelector::Mix,
            9,
        )
        .unwrap();

    assert_eq!(done, 1);
    assert_eq!(pwm.pulses(), expected_pulses(cfg.mix_channel, 1, &cfg));
    assert_eq!(
        sink.events.first(),
        Some(&AppEvent::CycleStarted {
            selector: ChannelSelector::Mix,
            count: 1
        })
    );
}

#[test]
fn countdown_reports_remaining() {
    let runner = CycleRunner::new(PwmConfig::default());
    let mut sink = RecordingSink::new();
    runner
        .run(
            &mut MockPwm::new(),
            &mut RecordingDelay::new(),
            &mut sink,
            channel(2),
            3,
        )
        .unwrap();

    let remaining: Vec<u32> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::CycleCompleted { remaining, .. } => Some(*remaining),
            _ => None,
        })
        .collect();
    assert_eq!(remaining, vec![2, 1, 0]);
}

#[test]
fn from_args_sets_frequency_then_cycles() {
    let cfg = PwmConfig::default();
    let mut pwm = MockPwm::new();

    let done = run_from_args(
        &["5", "2"],
        &cfg,
        |_| Ok::<_, Error>(&mut pwm),
        &mut RecordingDelay::new(),
        &mut RecordingSink::new(),
    )
    .unwrap();

    assert_eq!(done, 2);
    assert_eq!(pwm.calls[0], PwmCall::Frequency(cfg.frequency_hz));
    assert_eq!(pwm.pulses(), expected_pulses(5, 2, &cfg));
}

#[test]
fn from_args_mix_ignores_count() {
    let cfg = PwmConfig::default();
    let mut pwm = MockPwm::new();
    let done = run_from_args(
        &["mix", "4"],
        &cfg,
        |_| Ok::<_, Error>(&mut pwm),
        &mut RecordingDelay::new(),
        &mut RecordingSink::new(),
    )
    .unwrap();
    assert_eq!(done, 1);
    assert_eq!(pwm.pulses().len(), 2);
}

#[test]
fn unknown_selector_never_opens_the_controller() {
    for bad in ["6", "-1", "MIX", "servo", ""] {
        let mut opened = false;
        let mut delay = RecordingDelay::new();
        let mut sink = RecordingSink::new();

        let err = run_from_args(
            &[bad, "1"],
            &PwmConfig::default(),
            |_| {
                opened = true;
                Ok::<_, Error>(MockPwm::new())
            },
            &mut delay,
            &mut sink,
        )
        .unwrap_err();

        assert!(
            matches!(err, Error::UnknownChannel(_)),
            "{bad:?} gave {err:?}"
        );
        assert!(!opened);
        assert!(delay.delays_ms.is_empty());
        assert!(sink.events.is_empty());
    }
}

#[test]
fn missing_count_never_opens_the_controller() {
    let mut opened = false;
    let err = run_from_args(
        &["3"],
        &PwmConfig::default(),
        |_| {
            opened = true;
            Ok::<_, Error>(MockPwm::new())
        },
        &mut RecordingDelay::new(),
        &mut RecordingSink::new(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingArgument(_)));
    assert!(!opened);
}

#[test]
fn open_failure_is_returned_before_any_command() {
    let err = run_from_args(
        &["0", "1"],
        &PwmConfig::default(),
        |_| Err::<MockPwm, _>(Error::Actuator(ActuatorError::PwmWriteFailed)),
        &mut RecordingDelay::new(),
        &mut RecordingSink::new(),
    )
    .unwrap_err();
    assert_eq!(err, Error::Actuator(ActuatorError::PwmWriteFailed));
}

#[test]
fn pwm_failure_stops_the_run() {
    let runner = CycleRunner::new(PwmConfig::default());
    let mut pwm = MockPwm {
        fail_after: Some(3),
        ..MockPwm::new()
    };
    let mut sink = RecordingSink::new();

    let err = runner
        .run(
            &mut pwm,
            &mut RecordingDelay::new(),
            &mut sink,
            channel(0),
            5,
        )
        .unwrap_err();

    assert_eq!(err, Error::Actuator(ActuatorError::PwmWriteFailed));
    assert_eq!(pwm.pulses().len(), 3);
    assert_eq!(
        sink.count(|e| matches!(e, AppEvent::CycleCompleted { .. })),
        1
    );
}
