// Randomized delay before a check-in so that clients fired by the same
// cron trigger do not all reach the server in the same second.

use std::thread;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;

/// Upper bound (exclusive) of the delay, in whole seconds.
pub const MAX_JITTER_SECS: u64 = 60;

/// Draw a uniformly distributed whole number of seconds in `[0, 60)`.
pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Duration {
    Duration::from_secs(rng.random_range(0..MAX_JITTER_SECS))
}

/// Draw from a freshly seeded thread-local generator. Nothing is persisted
/// between runs.
pub fn draw_fresh() -> Duration {
    draw(&mut rand::rng())
}

/// Block the calling thread for `delay`. A progress bar is drawn on stderr
/// when it is a terminal; under cron it stays hidden.
pub fn wait(delay: Duration) {
    let secs = delay.as_secs();
    let bar = ProgressBar::new(secs);
    if let Ok(style) = ProgressStyle::with_template("{spinner} waiting {pos}/{len}s") {
        bar.set_style(style);
    }
    for _ in 0..secs {
        thread::sleep(Duration::from_secs(1));
        bar.inc(1);
    }
    thread::sleep(delay - Duration::from_secs(secs));
    bar.finish_and_clear();
}
