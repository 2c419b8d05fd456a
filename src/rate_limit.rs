use std::time::{Duration, Instant};

/// Minimum-spacing policy for requests toward one provider.
///
/// The delay computation is separated from the actual sleep so the policy can
/// be exercised in tests without wall-clock waits.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_request: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_request: None,
        }
    }

    /// Remaining wait before the next request may go out, and marks the
    /// request as issued at `now + wait`.
    pub fn delay_until_ready(&mut self, now: Instant) -> Duration {
        let wait = match self.last_request {
            None => Duration::ZERO,
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
        };
        self.last_request = Some(now + wait);
        wait
    }

    /// Blocks until the policy allows the next request.
    pub fn pause(&mut self) {
        let wait = self.delay_until_ready(Instant::now());
        if !wait.is_zero() {
            std::thread::sleep(wait);
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::Pacer;

    #[test]
    fn first_request_goes_straight_through() {
        let mut pacer = Pacer::new(Duration::from_millis(700));
        assert_eq!(pacer.delay_until_ready(Instant::now()), Duration::ZERO);
    }

    #[test]
    fn back_to_back_requests_wait_the_full_interval() {
        let mut pacer = Pacer::new(Duration::from_millis(700));
        let t0 = Instant::now();
        assert_eq!(pacer.delay_until_ready(t0), Duration::ZERO);
        assert_eq!(pacer.delay_until_ready(t0), Duration::from_millis(700));
    }

    #[test]
    fn elapsed_time_reduces_the_wait() {
        let mut pacer = Pacer::new(Duration::from_millis(700));
        let t0 = Instant::now();
        pacer.delay_until_ready(t0);
        let wait = pacer.delay_until_ready(t0 + Duration::from_millis(500));
        assert_eq!(wait, Duration::from_millis(200));
    }

    #[test]
    fn slow_caller_never_waits() {
        let mut pacer = Pacer::new(Duration::from_millis(700));
        let t0 = Instant::now();
        pacer.delay_until_ready(t0);
        let wait = pacer.delay_until_ready(t0 + Duration::from_secs(2));
        assert_eq!(wait, Duration::ZERO);
    }

    #[test]
    fn zero_interval_is_a_no_op_policy() {
        let mut pacer = Pacer::new(Duration::ZERO);
        let t0 = Instant::now();
        assert_eq!(pacer.delay_until_ready(t0), Duration::ZERO);
        assert_eq!(pacer.delay_until_ready(t0), Duration::ZERO);
    }
}
