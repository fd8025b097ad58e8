use crate::Delay;
use std::thread::sleep;
use std::time::Duration;

/// [Delay] backed by [std::thread::sleep].
#[derive(Debug, Default, Copy, Clone)]
pub struct ThreadDelay;

impl ThreadDelay {
    pub fn new() -> Self {
        ThreadDelay
    }
}

impl Delay for ThreadDelay {
    fn sleep_ms(&mut self, millis: u32) {
        sleep(Duration::from_millis(millis as u64));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleeps_at_least_requested_time() {
        let mut delay = ThreadDelay::new();
        let start = Instant::now();
        delay.sleep_ms(5);
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
