//! Time source for the discovery poll loop

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;

    /// Blocks the calling thread for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Simulated clock: `sleep` returns immediately and advances `now`.
///
/// Hooks registered with [`ManualClock::on_tick`] run after the matching tick,
/// which lets tests change the file system while discovery is polling.
pub struct ManualClock {
    now: Mutex<SystemTime>,
    ticks: AtomicU64,
    hooks: Mutex<Vec<(u64, Box<dyn FnOnce() + Send>)>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            now: Mutex::new(start),
            ticks: AtomicU64::new(0),
            hooks: Mutex::new(Vec::new()),
        }
    }

    /// Number of times `sleep` has been called
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::SeqCst)
    }

    pub fn on_tick(&self, tick: u64, hook: impl FnOnce() + Send + 'static) {
        self.hooks.lock().unwrap().push((tick, Box::new(hook)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.now.lock().unwrap()
    }

    fn sleep(&self, duration: Duration) {
        {
            let mut now = self.now.lock().unwrap();
            *now += duration;
        }
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;

        let due: Vec<_> = {
            let mut hooks = self.hooks.lock().unwrap();
            let (due, pending): (Vec<_>, Vec<_>) =
                hooks.drain(..).partition(|(at, _)| *at == tick);
            *hooks = pending;
            due
        };
        for (_, hook) in due {
            hook();
        }
    }
}
