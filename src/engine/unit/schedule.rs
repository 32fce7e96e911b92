use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Self-rescheduling tick timer of a unit.
///
/// The schedule holds at most one pending deadline. Stopping it only
/// suppresses future deadlines; whatever tick is already executing runs to
/// completion.
#[derive(Debug)]
pub struct PollSchedule {
    interval: Duration,
    running: CancellationToken,
    next: Option<Instant>,
}

impl PollSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            running: CancellationToken::new(),
            next: None,
        }
    }

    /// Schedule a tick right away.
    pub fn arm_now(&mut self) {
        if !self.is_stopped() {
            self.next = Some(Instant::now());
        }
    }

    /// Schedule the next tick one interval from now, unless stopped.
    pub fn reschedule(&mut self) {
        self.next = if self.is_stopped() {
            None
        } else {
            Some(Instant::now() + self.interval)
        };
    }

    pub fn stop(&mut self) {
        self.running.cancel();
        self.next = None;
    }

    pub fn is_stopped(&self) -> bool {
        self.running.is_cancelled()
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Completes when the pending deadline is reached and disarms it. Pending
    /// forever when nothing is scheduled. Cancel safe: dropping the future
    /// keeps the deadline.
    pub async fn elapsed(&mut self) {
        match self.next {
            Some(at) => {
                tokio::time::sleep_until(at).await;
                self.next = None;
            }
            None => futures::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn reschedule_waits_one_interval() {
        let mut schedule = PollSchedule::new(Duration::from_secs(1));
        assert!(!schedule.is_armed());

        let start = Instant::now();
        schedule.arm_now();
        schedule.elapsed().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(!schedule.is_armed());

        schedule.reschedule();
        schedule.elapsed().await;
        assert_eq!(start.elapsed(), Duration::from_secs(1));
    }

    #[test]
    fn stop_suppresses_future_ticks() {
        let mut schedule = PollSchedule::new(Duration::from_secs(1));
        schedule.arm_now();
        schedule.stop();

        assert!(schedule.is_stopped());
        assert!(!schedule.is_armed());
        schedule.reschedule();
        schedule.arm_now();
        assert!(!schedule.is_armed());
    }
}
