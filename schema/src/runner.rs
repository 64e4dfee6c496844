use std::num::NonZeroU8;
use std::time::Duration;

use futures::Future;

use crate::Scheduler;

/// A `Runner` replays a day of orders against a `Scheduler`, advancing the
/// simulated clock itself. The returned `Response` future drives the replay
/// to the end of the day.
pub trait Runner<S: Scheduler> {
    type Response: Future<Output = Result<Self::Success, Self::Error>>;
    type Success;
    type Error;

    /// Starts the replay against the provided `Scheduler`.
    fn run(&self, scheduler: S) -> Self::Response;
}

/// Ratio of simulated time to wall-clock time for a replay.
#[derive(Default, Clone, Copy, Debug)]
pub enum Speed {
    #[default]
    RealTime,
    /// Speed up the replay by the provided multiplier (e.g. `2` gives double speed)
    FastForward(NonZeroU8),
    /// Slow down the replay by the provided multiplier (e.g. `2` gives half speed)
    #[allow(unused)]
    SlowMotion(NonZeroU8),
}

impl Speed {
    pub fn fast_forward(rate: u8) -> Option<Self> {
        NonZeroU8::new(rate).map(Self::FastForward)
    }

    /// How long one simulated second takes on the wall clock.
    pub fn adjust_duration(&self, duration: Duration) -> Duration {
        match self {
            Self::RealTime => duration,
            Self::FastForward(x) => duration / x.get() as u32,
            Self::SlowMotion(x) => duration * x.get() as u32,
        }
    }
}
