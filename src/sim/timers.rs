//! Delayed session events
//!
//! Replaces engine-owned delayed callbacks: sessions schedule an event, and
//! the queue hands it back from [`TimerQueue::advance`] once its time is up.
//! Steps arrive as `f32` milliseconds but the clock accumulates in `f64`, so
//! due times stay exact over long sessions.

/// A pending event
#[derive(Debug, Clone)]
struct Timer<E> {
    due_ms: f64,
    /// Insertion order, breaks ties between equal due times
    seq: u64,
    event: E,
}

/// Session-local timer queue on a millisecond clock
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    now_ms: f64,
    next_seq: u64,
    pending: Vec<Timer<E>>,
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self {
            now_ms: 0.0,
            next_seq: 0,
            pending: Vec::new(),
        }
    }
}

impl<E> TimerQueue<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session time elapsed so far
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Fire `event` after `delay_ms` of session time
    pub fn schedule(&mut self, delay_ms: f32, event: E) {
        let timer = Timer {
            due_ms: self.now_ms + f64::from(delay_ms.max(0.0)),
            seq: self.next_seq,
            event,
        };
        self.next_seq += 1;
        self.pending.push(timer);
    }

    /// Advance the clock and return due events, earliest first
    pub fn advance(&mut self, dt_ms: f32) -> Vec<E> {
        self.now_ms += f64::from(dt_ms.max(0.0));
        let now = self.now_ms;

        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|t| t.due_ms <= now);
        self.pending = pending;

        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));
        due.into_iter().map(|t| t.event).collect()
    }

    /// Drop every pending event
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_fire_when_due_in_order() {
        let mut q = TimerQueue::new();
        q.schedule(160.0, "c");
        q.schedule(0.0, "a");
        q.schedule(80.0, "b");
        q.schedule(80.0, "b2");

        assert_eq!(q.advance(0.0), vec!["a"]);
        assert!(q.advance(50.0).is_empty());
        assert_eq!(q.advance(50.0), vec!["b", "b2"]);
        assert_eq!(q.len(), 1);
        assert_eq!(q.advance(100.0), vec!["c"]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_schedule_is_relative_to_now() {
        let mut q = TimerQueue::new();
        q.advance(1000.0);
        q.schedule(10.0, 1);
        assert!(q.advance(5.0).is_empty());
        assert_eq!(q.advance(5.0), vec![1]);
        assert_eq!(q.now_ms(), 1010.0);
    }

    #[test]
    fn test_long_session_keeps_step_precision() {
        let mut q = TimerQueue::new();
        let step = 1000.0 / 60.0;
        // ten hours of 60 Hz steps
        let steps = 60 * 60 * 60 * 10;
        for _ in 0..steps {
            q.advance(step);
        }
        q.schedule(50.0, "late");
        assert!(q.advance(step).is_empty());
        assert!(q.advance(step).is_empty());
        assert!(q.advance(step).is_empty());
        assert_eq!(q.advance(step), vec!["late"]);
        assert!((q.now_ms() - f64::from(step) * f64::from(steps + 4)).abs() < 0.1);
    }

    #[test]
    fn test_clear() {
        let mut q = TimerQueue::new();
        q.schedule(1.0, ());
        q.clear();
        assert!(q.advance(10.0).is_empty());
    }
}
