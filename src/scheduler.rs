use std::time::{Duration, Instant};
use tao::event_loop::ControlFlow;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// The repeating tick timer on the event loop. Registered by `start`,
/// deregistered by `stop`; a late tick fires once and re-arms from `now`.
pub struct Scheduler {
    period: Duration,
    next_tick: Option<Instant>,
}

impl Scheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_tick: None,
        }
    }

    /// Arms the timer. The caller runs the first tick right away.
    pub fn start(&mut self, now: Instant) {
        self.next_tick = Some(now + self.period);
    }

    pub fn stop(&mut self) {
        self.next_tick = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    /// True when a tick is owed; re-arms the timer when it is.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_tick {
            Some(deadline) if now >= deadline => {
                self.next_tick = Some(now + self.period);
                true
            }
            _ => false,
        }
    }

    pub fn control_flow(&self) -> ControlFlow {
        match self.next_tick {
            Some(deadline) => ControlFlow::WaitUntil(deadline),
            None => ControlFlow::Wait,
        }
    }
}
