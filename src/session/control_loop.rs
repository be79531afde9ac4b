//! # Control Loop
//!
//! One cycle: check the stop flag, pump input, sample every channel, apply
//! deadzones and clamps, deliver the frame. Success sleeps the cycle
//! interval, a transient failure sleeps the error backoff.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::{LoopSettings, SessionState, Shutdown};
use crate::controller::calibration::DeadzoneClamp;
use crate::controller::channel::ChannelSet;
use crate::controller::channel_mapper::ChannelMapper;
use crate::controller::AxisSource;
use crate::error::Result;
use crate::transport::CommandSink;

/// Number of delivered frames between progress messages
pub const FRAME_LOG_INTERVAL: u64 = 1000;

/// Outcome of a single cycle
#[derive(Debug)]
pub enum Tick {
    /// Sleep for the given time, then run another cycle
    Continue(Duration),
    /// The session is over
    Stop(Shutdown),
}

/// Fixed-rate pipeline driver
pub struct ControlLoop<S: AxisSource, K: CommandSink> {
    source: S,
    sink: K,
    channels: ChannelSet,
    settings: LoopSettings,
    state: SessionState,
    stop: Arc<AtomicBool>,
    frames_sent: u64,
}

impl<S: AxisSource, K: CommandSink> ControlLoop<S, K> {
    #[must_use]
    pub fn new(source: S, sink: K, channels: ChannelSet, settings: LoopSettings) -> Self {
        Self {
            source,
            sink,
            channels,
            settings,
            state: SessionState::Connected,
            stop: Arc::new(AtomicBool::new(false)),
            frames_sent: 0,
        }
    }

    /// Flag that ends the session at the start of the next cycle.
    ///
    /// Safe to set from a signal handler.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn frames_sent(&self) -> u64 {
        self.frames_sent
    }

    /// Run one cycle
    ///
    /// # Errors
    ///
    /// Returns the error if the cycle failed for a non-transient reason
    /// (configuration or encoding). Transient failures are absorbed into
    /// [`Tick::Continue`] or [`Tick::Stop`].
    pub fn tick(&mut self) -> Result<Tick> {
        if self.stop.load(Ordering::SeqCst) {
            info!("Stop requested, shutting down...");
            self.state = SessionState::Disconnected;
            return Ok(Tick::Stop(Shutdown::Interrupted));
        }

        self.source.pump();

        match self.cycle() {
            Ok(()) => {
                let recovered = self.state.failures();
                if recovered > 0 {
                    info!("Link recovered after {} failed cycles", recovered);
                }
                self.state = self.state.on_success();

                self.frames_sent += 1;
                if self.frames_sent % FRAME_LOG_INTERVAL == 0 {
                    debug!("Sent {} frames", self.frames_sent);
                }

                Ok(Tick::Continue(self.settings.cycle_interval))
            }
            Err(e) if e.is_transient() => {
                let threshold = self.settings.error_threshold;
                let failures = self.state.failures().saturating_add(1);
                self.state = self.state.on_failure(threshold);

                if self.state.is_disconnected() {
                    error!(
                        "Giving up after {} consecutive failures, last error: {}",
                        failures, e
                    );
                    Ok(Tick::Stop(Shutdown::ThresholdExceeded {
                        failures,
                        last_error: e,
                    }))
                } else {
                    warn!("Cycle failed ({}/{}): {}", failures, threshold, e);
                    Ok(Tick::Continue(self.settings.error_backoff))
                }
            }
            Err(e) => {
                error!("Fatal error in control loop: {}", e);
                self.state = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    fn cycle(&mut self) -> Result<()> {
        let frame = ChannelMapper::new(&self.channels).sample(&self.source)?;
        let frame = DeadzoneClamp::new(&self.channels).apply(frame);
        self.sink.deliver(&self.channels, &frame)
    }

    /// Run cycles until the session ends
    ///
    /// The sink is closed on every exit path; the input source is released
    /// when the loop is dropped.
    ///
    /// # Errors
    ///
    /// Returns the first non-transient error.
    pub fn run(mut self) -> Result<Shutdown> {
        info!("Streaming {}", self.channels.describe());

        let outcome = loop {
            match self.tick() {
                Ok(Tick::Continue(delay)) => thread::sleep(delay),
                Ok(Tick::Stop(shutdown)) => break Ok(shutdown),
                Err(e) => break Err(e),
            }
        };

        self.sink.close();
        info!("Total frames sent: {}", self.frames_sent);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{FixedAxes, MockAxisSource};
    use crate::controller::channel::SampledFrame;
    use crate::error::PadBridgeError;
    use crate::transport::mocks::MockLink;
    use crate::transport::WireSink;

    const REST_FRAME: [u8; 6] = [0x00, 0x00, 0x00, 0x00, 0x27, 0x10];

    fn centered() -> FixedAxes {
        FixedAxes::new(vec![0.0; 8])
    }

    fn instant() -> LoopSettings {
        LoopSettings {
            cycle_interval: Duration::ZERO,
            error_backoff: Duration::ZERO,
            error_threshold: 10,
        }
    }

    fn wire_loop(link: &MockLink, settings: LoopSettings) -> ControlLoop<FixedAxes, WireSink<MockLink>> {
        ControlLoop::new(centered(), WireSink::new(link.clone()), ChannelSet::three_axis(), settings)
    }

    /// Sink that rejects every frame as misconfigured
    struct RejectingSink;

    impl CommandSink for RejectingSink {
        fn deliver(&mut self, _channels: &ChannelSet, _frame: &SampledFrame) -> Result<()> {
            Err(PadBridgeError::config("frame does not match firmware layout"))
        }

        fn close(&mut self) {}
    }

    // ==== Tick Tests ====

    #[test]
    fn test_tick_sends_rest_frame() {
        let link = MockLink::new();
        let mut control = wire_loop(&link, LoopSettings::default());

        match control.tick().unwrap() {
            Tick::Continue(delay) => assert_eq!(delay, Duration::from_millis(10)),
            other => panic!("Expected Continue, got: {:?}", other),
        }
        assert_eq!(link.get_sent(), vec![REST_FRAME.to_vec()]);
        assert_eq!(control.state(), SessionState::Connected);
        assert_eq!(control.frames_sent(), 1);
    }

    #[test]
    fn test_tick_full_deflection_frame() {
        let link = MockLink::new();
        let mut axes = centered();
        axes.set(0, 1.0);
        axes.set(1, -1.0);
        axes.set(4, -1.0);
        let mut control = ControlLoop::new(
            axes,
            WireSink::new(link.clone()),
            ChannelSet::three_axis(),
            instant(),
        );

        control.tick().unwrap();
        assert_eq!(link.get_sent(), vec![vec![0x27, 0x10, 0xD8, 0xF0, 0x00, 0x00]]);
    }

    #[test]
    fn test_transient_failure_backs_off() {
        let link = MockLink::new();
        link.fail_next(1);
        let mut control = wire_loop(&link, LoopSettings::default());

        match control.tick().unwrap() {
            Tick::Continue(delay) => assert_eq!(delay, Duration::from_millis(200)),
            other => panic!("Expected Continue, got: {:?}", other),
        }
        assert_eq!(control.state(), SessionState::ErrorCounting(1));
        assert_eq!(control.frames_sent(), 0);
    }

    #[test]
    fn test_nine_failures_then_success_resets() {
        let link = MockLink::new();
        link.fail_next(9);
        link.succeed_next(1);
        let mut control = wire_loop(&link, instant());

        for expected in 1..=9 {
            assert!(matches!(control.tick().unwrap(), Tick::Continue(_)));
            assert_eq!(control.state(), SessionState::ErrorCounting(expected));
        }

        assert!(matches!(control.tick().unwrap(), Tick::Continue(_)));
        assert_eq!(control.state(), SessionState::Connected);
        assert_eq!(link.get_sent().len(), 1);
    }

    #[test]
    fn test_tenth_consecutive_failure_disconnects() {
        let link = MockLink::new();
        link.fail_next(10);
        let mut control = wire_loop(&link, instant());

        for _ in 0..9 {
            assert!(matches!(control.tick().unwrap(), Tick::Continue(_)));
        }

        match control.tick().unwrap() {
            Tick::Stop(Shutdown::ThresholdExceeded { failures, last_error }) => {
                assert_eq!(failures, 10);
                assert!(matches!(last_error, PadBridgeError::Transport(_)));
            }
            other => panic!("Expected ThresholdExceeded, got: {:?}", other),
        }
        assert_eq!(control.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_input_and_transport_failures_share_counter() {
        let link = MockLink::new();
        link.fail_next(5);

        let mut source = MockAxisSource::new();
        source.expect_pump().return_const(());
        let mut call = 0;
        source.expect_poll_axis().returning(move |_| {
            call += 1;
            // Three channels per cycle; the first five cycles read fine
            if call > 15 {
                Err(PadBridgeError::Input("controller unplugged".into()))
            } else {
                Ok(0.0)
            }
        });

        let mut control = ControlLoop::new(
            source,
            WireSink::new(link.clone()),
            ChannelSet::three_axis(),
            instant(),
        );

        for _ in 0..9 {
            assert!(matches!(control.tick().unwrap(), Tick::Continue(_)));
        }
        assert_eq!(control.state(), SessionState::ErrorCounting(9));

        match control.tick().unwrap() {
            Tick::Stop(Shutdown::ThresholdExceeded { last_error, .. }) => {
                assert!(matches!(last_error, PadBridgeError::Input(_)));
            }
            other => panic!("Expected ThresholdExceeded, got: {:?}", other),
        }
        assert!(link.get_sent().is_empty());
    }

    #[test]
    fn test_input_failure_skips_delivery() {
        let link = MockLink::new();
        let mut source = MockAxisSource::new();
        source.expect_pump().times(1).return_const(());
        source
            .expect_poll_axis()
            .returning(|_| Err(PadBridgeError::Input("read failed".into())));

        let mut control = ControlLoop::new(
            source,
            WireSink::new(link.clone()),
            ChannelSet::three_axis(),
            instant(),
        );

        control.tick().unwrap();
        assert!(link.get_sent().is_empty());
        assert_eq!(control.state(), SessionState::ErrorCounting(1));
    }

    #[test]
    fn test_config_error_is_fatal() {
        let mut control = ControlLoop::new(centered(), RejectingSink, ChannelSet::three_axis(), instant());

        let err = control.tick().unwrap_err();
        assert!(err.is_config());
        assert_eq!(control.state(), SessionState::Disconnected);
    }

    #[test]
    fn test_stop_flag_checked_before_pump() {
        let mut source = MockAxisSource::new();
        source.expect_pump().never();
        source.expect_poll_axis().never();

        let link = MockLink::new();
        let mut control = ControlLoop::new(
            source,
            WireSink::new(link.clone()),
            ChannelSet::three_axis(),
            instant(),
        );
        control.stop_handle().store(true, Ordering::SeqCst);

        assert!(matches!(
            control.tick().unwrap(),
            Tick::Stop(Shutdown::Interrupted)
        ));
        assert!(link.get_sent().is_empty());
    }

    // ==== Run Tests ====

    #[test]
    fn test_run_stops_on_threshold_and_closes_sink() {
        let link = MockLink::new();
        link.succeed_next(3);
        link.fail_next(10);
        let control = wire_loop(&link, instant());

        let shutdown = control.run().unwrap();
        assert!(matches!(shutdown, Shutdown::ThresholdExceeded { failures: 10, .. }));
        assert_eq!(link.get_sent().len(), 3);
        assert_eq!(link.close_count(), 1);
    }

    #[test]
    fn test_run_interrupted_closes_sink() {
        let link = MockLink::new();
        let control = wire_loop(&link, instant());
        control.stop_handle().store(true, Ordering::SeqCst);

        let shutdown = control.run().unwrap();
        assert!(matches!(shutdown, Shutdown::Interrupted));
        assert!(link.get_sent().is_empty());
        assert_eq!(link.close_count(), 1);
    }

    #[test]
    fn test_run_returns_fatal_error() {
        let control = ControlLoop::new(centered(), RejectingSink, ChannelSet::three_axis(), instant());
        assert!(control.run().unwrap_err().is_config());
    }

    #[test]
    fn test_run_stops_from_another_thread() {
        let link = MockLink::new();
        let settings = LoopSettings {
            cycle_interval: Duration::from_millis(1),
            ..instant()
        };
        let control = wire_loop(&link, settings);
        let stop = control.stop_handle();

        let stopper = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop.store(true, Ordering::SeqCst);
        });

        let shutdown = control.run().unwrap();
        stopper.join().unwrap();

        assert!(matches!(shutdown, Shutdown::Interrupted));
        assert!(!link.get_sent().is_empty());
        assert!(link.get_sent().iter().all(|frame| frame == &REST_FRAME));
        assert_eq!(link.close_count(), 1);
    }
}
