//! End-to-end checks of the sample, clamp, encode, send pipeline through
//! the public API.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pad_bridge::config::Config;
use pad_bridge::controller::channel::ChannelSet;
use pad_bridge::controller::{check_axes, FixedAxes};
use pad_bridge::error::{PadBridgeError, Result};
use pad_bridge::frame::decoder::decode_frame;
use pad_bridge::session::{ControlLoop, ExitStatus, LoopSettings, SessionState, Shutdown, Tick};
use pad_bridge::transport::diagnostic::DiagnosticSink;
use pad_bridge::transport::{Transport, WireSink};

/// Link that records frames and fails the sends listed in `failing`
#[derive(Clone, Default)]
struct RecordingLink {
    sent: Rc<RefCell<Vec<Vec<u8>>>>,
    attempts: Rc<RefCell<usize>>,
    failing: Rc<RefCell<Vec<usize>>>,
    closed: Rc<RefCell<usize>>,
}

impl Transport for RecordingLink {
    fn send(&mut self, frame: &[u8]) -> Result<()> {
        let attempt = {
            let mut attempts = self.attempts.borrow_mut();
            *attempts += 1;
            *attempts
        };
        if self.failing.borrow().contains(&attempt) {
            return Err(PadBridgeError::Transport(format!("attempt {} rejected", attempt)));
        }
        self.sent.borrow_mut().push(frame.to_vec());
        Ok(())
    }

    fn close(&mut self) {
        *self.closed.borrow_mut() += 1;
    }

    fn describe(&self) -> String {
        "recording link".to_string()
    }
}

fn instant(threshold: u32) -> LoopSettings {
    LoopSettings {
        cycle_interval: Duration::ZERO,
        error_backoff: Duration::ZERO,
        error_threshold: threshold,
    }
}

#[test]
fn test_centered_sticks_send_rest_frame() {
    let link = RecordingLink::default();
    let mut control = ControlLoop::new(
        FixedAxes::new(vec![0.0; 6]),
        WireSink::new(link.clone()),
        ChannelSet::three_axis(),
        instant(10),
    );

    control.tick().unwrap();
    assert_eq!(*link.sent.borrow(), vec![vec![0x00, 0x00, 0x00, 0x00, 0x27, 0x10]]);
}

#[test]
fn test_full_deflection_frame() {
    let link = RecordingLink::default();
    let mut axes = FixedAxes::new(vec![0.0; 6]);
    axes.set(0, 1.0);
    axes.set(1, -1.0);
    axes.set(4, -1.0);
    let mut control = ControlLoop::new(axes, WireSink::new(link.clone()), ChannelSet::three_axis(), instant(10));

    control.tick().unwrap();
    let frame = link.sent.borrow()[0].clone();
    assert_eq!(frame, vec![0x27, 0x10, 0xD8, 0xF0, 0x00, 0x00]);
    assert_eq!(decode_frame(&frame, 3).unwrap(), vec![10_000, -10_000, 0]);
}

#[test]
fn test_noise_inside_deadzone_reads_as_rest() {
    let link = RecordingLink::default();
    let mut axes = FixedAxes::new(vec![0.0; 6]);
    axes.set(0, 0.015);
    axes.set(1, -0.0199);
    axes.set(4, 0.01);
    let mut control = ControlLoop::new(axes, WireSink::new(link.clone()), ChannelSet::three_axis(), instant(10));

    control.tick().unwrap();
    assert_eq!(link.sent.borrow()[0], vec![0x00, 0x00, 0x00, 0x00, 0x27, 0x10]);
}

#[test]
fn test_planar_preset_clamps_to_legal_range() {
    let config = Config::parse(include_str!("../config/planar.toml")).unwrap();
    let channels = config.channel_set().unwrap();
    let link = RecordingLink::default();
    let axes = FixedAxes::new(vec![1.0, -1.0]);
    check_axes(&channels, &axes).unwrap();

    let mut control = ControlLoop::new(axes, WireSink::new(link.clone()), channels, instant(10));
    control.tick().unwrap();

    let frame = link.sent.borrow()[0].clone();
    assert_eq!(decode_frame(&frame, 2).unwrap(), vec![1999, -1999]);
}

#[test]
fn test_unsigned_preset_floors_at_zero() {
    let config = Config::parse(include_str!("../config/unsigned.toml")).unwrap();
    let channels = config.channel_set().unwrap();
    let link = RecordingLink::default();
    let mut axes = FixedAxes::new(vec![0.0; 6]);
    axes.set(0, -1.3);
    axes.set(1, 1.0);

    let mut control = ControlLoop::new(axes, WireSink::new(link.clone()), channels, instant(10));
    control.tick().unwrap();

    let frame = link.sent.borrow()[0].clone();
    assert_eq!(decode_frame(&frame, 3).unwrap(), vec![0, 20_000, 10_000]);
}

#[test]
fn test_check_axes_rejects_missing_axis() {
    let err = check_axes(&ChannelSet::three_axis(), &FixedAxes::new(vec![0.0; 2])).unwrap_err();
    assert!(err.is_config());
    assert_eq!(ExitStatus::from_error(&err), ExitStatus::Config);
}

#[test]
fn test_recovers_after_nine_failures() {
    let link = RecordingLink::default();
    *link.failing.borrow_mut() = (1..=9).collect();
    let mut control = ControlLoop::new(
        FixedAxes::new(vec![0.0; 6]),
        WireSink::new(link.clone()),
        ChannelSet::three_axis(),
        instant(10),
    );

    for _ in 0..10 {
        assert!(matches!(control.tick().unwrap(), Tick::Continue(_)));
    }
    assert_eq!(control.state(), SessionState::Connected);
    assert_eq!(link.sent.borrow().len(), 1);
}

#[test]
fn test_disconnects_after_threshold_and_closes_link() {
    let link = RecordingLink::default();
    // Two good frames, one failure, one good frame, then a dead link
    *link.failing.borrow_mut() = std::iter::once(3).chain(5..=14).collect();
    let control = ControlLoop::new(
        FixedAxes::new(vec![0.0; 6]),
        WireSink::new(link.clone()),
        ChannelSet::three_axis(),
        instant(10),
    );

    let shutdown = control.run().unwrap();
    match &shutdown {
        Shutdown::ThresholdExceeded { failures, .. } => assert_eq!(*failures, 10),
        other => panic!("Expected ThresholdExceeded, got: {:?}", other),
    }
    assert_eq!(ExitStatus::from(&shutdown), ExitStatus::ThresholdExceeded);
    assert_eq!(*link.attempts.borrow(), 14);
    assert_eq!(link.sent.borrow().len(), 3);
    assert_eq!(*link.closed.borrow(), 1);
}

#[test]
fn test_observe_mode_prints_values() {
    let mut control = ControlLoop::new(
        FixedAxes::new(vec![0.0; 6]),
        DiagnosticSink::new(Vec::new()).with_frame_dump(true),
        ChannelSet::three_axis(),
        instant(10),
    );

    control.tick().unwrap();
    control.tick().unwrap();
    assert_eq!(control.frames_sent(), 2);
}
