//! The per-tick consumer of queued input.

use ::std::time::Duration;
use ::tracing::{debug, trace};

use crate::{
    input::{keyboard::KeyboardInput, mouse::MouseInput, InputEvent, InputQueue},
    time::MonotonicTimestamp,
};

/// Receives input drained by a [`SimulationStep`]. This is the boundary
/// between the input pipeline and game logic.
pub trait InputSink {
    fn on_mouse(&mut self, _event: &InputEvent<MouseInput>) {}

    fn on_keyboard(&mut self, _event: &InputEvent<KeyboardInput>) {}
}

/// An [`InputSink`] that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl InputSink for NullSink {}

/// What a single [`SimulationStep::step`] drained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StepReport {
    pub mouse_events: usize,
    pub keyboard_events: usize,
    /// Keyboard overrun events, which are dropped rather than delivered.
    pub discarded_overruns: usize,
}

/// Drains the input queues once per simulation tick.
///
/// After [`step`] returns, both queues are empty: the next tick only ever
/// sees input that arrived after this one.
///
/// [`step`]: Self::step
#[derive(Debug, Default)]
pub struct SimulationStep {
    ticks: u64,
    /// Human-readable description of the most recent input drained.
    last_input: String,
    last_input_time: Option<MonotonicTimestamp>,
}

impl SimulationStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains `mouse` then `keyboard`, each oldest first, into `sink`.
    pub fn step(
        &mut self,
        time_delta: Duration,
        mouse: &mut InputQueue<MouseInput>,
        keyboard: &mut InputQueue<KeyboardInput>,
        sink: &mut dyn InputSink,
    ) -> StepReport {
        self.ticks += 1;
        let mut report = StepReport::default();

        while let Some(event) = mouse.pop() {
            report.mouse_events += 1;
            self.remember(event.create_time, &event.data);
            sink.on_mouse(&event);
        }

        while let Some(event) = keyboard.pop() {
            if event.data.is_overrun() {
                debug!(at = %event.create_time, "Discarding keyboard overrun");
                report.discarded_overruns += 1;
                continue;
            }
            report.keyboard_events += 1;
            self.remember(event.create_time, &event.data);
            sink.on_keyboard(&event);
        }

        trace!(
            tick = self.ticks,
            dt_us = time_delta.as_micros() as u64,
            ?report,
            "Simulation step"
        );
        report
    }

    /// Number of completed steps.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// A description of the most recently arrived input drained so far, or
    /// the empty string if there has been none.
    pub fn last_input(&self) -> &str {
        &self.last_input
    }

    fn remember(&mut self, create_time: MonotonicTimestamp, data: &impl ToString) {
        if self.last_input_time.map_or(true, |last| create_time >= last) {
            self.last_input_time = Some(create_time);
            self.last_input = data.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keyboard::KeyboardKeyFlags;

    use ::pretty_assertions::assert_eq;

    fn at(ms: u64) -> MonotonicTimestamp {
        MonotonicTimestamp::from_elapsed(Duration::from_millis(ms))
    }

    fn key(make_code: u16, virtual_key: u16) -> KeyboardInput {
        KeyboardInput {
            make_code,
            key_flags: KeyboardKeyFlags::DOWN,
            virtual_key,
            message: 0x0100,
        }
    }

    fn moved(x: i32) -> MouseInput {
        MouseInput {
            last_x: x,
            ..Default::default()
        }
    }

    #[derive(Default)]
    struct Recorder {
        mouse: Vec<i32>,
        keys: Vec<u16>,
    }

    impl InputSink for Recorder {
        fn on_mouse(&mut self, event: &InputEvent<MouseInput>) {
            self.mouse.push(event.data.last_x);
        }

        fn on_keyboard(&mut self, event: &InputEvent<KeyboardInput>) {
            self.keys.push(event.data.make_code);
        }
    }

    #[test]
    fn test_step_drains_both_queues_in_order() {
        let mut mouse = InputQueue::new();
        let mut keyboard = InputQueue::new();
        for (ms, x) in [(1, 10), (2, 20), (3, 30)] {
            mouse.emplace(at(ms), moved(x));
        }
        keyboard.emplace(at(4), key(0x1E, 0x41));
        keyboard.emplace(at(5), key(0x30, 0x42));

        let mut step = SimulationStep::new();
        let mut sink = Recorder::default();
        let report = step.step(Duration::from_millis(16), &mut mouse, &mut keyboard, &mut sink);

        assert_eq!(
            report,
            StepReport {
                mouse_events: 3,
                keyboard_events: 2,
                discarded_overruns: 0,
            }
        );
        assert_eq!(sink.mouse, vec![10, 20, 30]);
        assert_eq!(sink.keys, vec![0x1E, 0x30]);
        assert!(mouse.is_empty());
        assert!(keyboard.is_empty());
        assert_eq!(step.ticks(), 1);
    }

    #[test]
    fn test_overruns_are_discarded() {
        let mut mouse = InputQueue::new();
        let mut keyboard = InputQueue::new();
        keyboard.emplace(at(1), key(0x1E, 0x41));
        keyboard.emplace(at(2), key(KeyboardInput::OVERRUN_MAKE_CODE, 0xFF));

        let mut sink = Recorder::default();
        let report = SimulationStep::new().step(Duration::ZERO, &mut mouse, &mut keyboard, &mut sink);

        assert_eq!(report.keyboard_events, 1);
        assert_eq!(report.discarded_overruns, 1);
        assert_eq!(sink.keys, vec![0x1E]);
        assert!(keyboard.is_empty());
    }

    #[test]
    fn test_last_input_tracks_most_recent_arrival() {
        let mut mouse = InputQueue::new();
        let mut keyboard = InputQueue::new();
        let mut step = SimulationStep::new();
        assert_eq!(step.last_input(), "");

        mouse.emplace(at(9), moved(4));
        keyboard.emplace(at(3), key(0x57, 0x7A));
        step.step(Duration::ZERO, &mut mouse, &mut keyboard, &mut NullSink);
        assert_eq!(step.last_input(), "Mouse: dx=4 dy=0");

        keyboard.emplace(at(12), key(0x57, 0x7A));
        step.step(Duration::ZERO, &mut mouse, &mut keyboard, &mut NullSink);
        assert_eq!(step.last_input(), "Keyboard: F11 down (make code 0x57)");
    }

    #[test]
    fn test_empty_step() {
        let mut mouse = InputQueue::new();
        let mut keyboard = InputQueue::new();

        let report =
            SimulationStep::new().step(Duration::ZERO, &mut mouse, &mut keyboard, &mut NullSink);
        assert_eq!(report, StepReport::default());
    }
}
