//! Timers and the frame loop
//!
//! The controller never talks to `setInterval` or `requestAnimationFrame`
//! directly. It goes through [`Scheduler`], which the browser implements with
//! real timers and tests implement with [`VirtualClock`].

/// Handle for one scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// What a timer is for. Delivered back to the controller when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Next display frame (one-shot, re-requested every frame)
    Frame,
    /// Object spawn cadence
    Spawn,
    /// Difficulty progression
    LevelUp,
    /// Intro + countdown poll on first load
    Intro,
    /// Short countdown before a retried run
    Countdown,
}

/// Timer source injected into the controller
pub trait Scheduler {
    /// Fire `kind` every `period_ms` until cancelled
    fn schedule_repeating(&mut self, period_ms: f64, kind: TimerKind) -> TimerId;
    /// Fire `kind` once after `delay_ms`. `TimerKind::Frame` waits for the next display frame.
    fn schedule_once(&mut self, delay_ms: f64, kind: TimerKind) -> TimerId;
    /// Stop a timer. Unknown or already-cancelled ids are ignored.
    fn cancel(&mut self, id: TimerId);
}

/// Repeating periods are clamped to this so a bad tuning value cannot stall the clock
pub const MIN_PERIOD_MS: f64 = 1.0;

#[derive(Debug, Clone)]
struct Pending {
    id: TimerId,
    kind: TimerKind,
    due_ms: f64,
    period_ms: Option<f64>,
    /// Tie-breaker: equal deadlines fire in scheduling order
    seq: u64,
}

/// Deterministic clock for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct VirtualClock {
    now_ms: f64,
    next_id: u64,
    next_seq: u64,
    pending: Vec<Pending>,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// Number of live timers of the given kind
    pub fn scheduled(&self, kind: TimerKind) -> usize {
        self.pending.iter().filter(|p| p.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Pop the earliest timer due at or before `until_ms`, moving `now` to its
    /// deadline. Repeating timers are re-armed before being returned.
    pub fn pop_due(&mut self, until_ms: f64) -> Option<(TimerId, TimerKind)> {
        let (idx, due) = self
            .pending
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)))
            .map(|(i, p)| (i, p.due_ms))?;
        if due > until_ms {
            return None;
        }

        self.now_ms = self.now_ms.max(due);
        let seq = self.bump_seq();
        let timer = &mut self.pending[idx];
        let fired = (timer.id, timer.kind);
        let period_ms = timer.period_ms;
        match period_ms {
            Some(period) => {
                timer.due_ms += period;
                timer.seq = seq;
            }
            None => {
                self.pending.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Move `now` forward without firing anything
    pub fn advance_to(&mut self, ms: f64) {
        self.now_ms = self.now_ms.max(ms);
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    fn push(&mut self, kind: TimerKind, delay_ms: f64, period_ms: Option<f64>) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        let seq = self.bump_seq();
        self.pending.push(Pending {
            id,
            kind,
            due_ms: self.now_ms + delay_ms.max(0.0),
            period_ms,
            seq,
        });
        id
    }
}

impl Scheduler for VirtualClock {
    fn schedule_repeating(&mut self, period_ms: f64, kind: TimerKind) -> TimerId {
        let period = period_ms.max(MIN_PERIOD_MS);
        self.push(kind, period, Some(period))
    }

    fn schedule_once(&mut self, delay_ms: f64, kind: TimerKind) -> TimerId {
        self.push(kind, delay_ms, None)
    }

    fn cancel(&mut self, id: TimerId) {
        self.pending.retain(|p| p.id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(clock: &mut VirtualClock, until: f64) -> Vec<(f64, TimerKind)> {
        let mut fired = Vec::new();
        while let Some((_, kind)) = clock.pop_due(until) {
            fired.push((clock.now_ms(), kind));
        }
        clock.advance_to(until);
        fired
    }

    #[test]
    fn test_repeating_fires_every_period() {
        let mut clock = VirtualClock::new();
        clock.schedule_repeating(1000.0, TimerKind::Spawn);
        let fired = drain(&mut clock, 3500.0);
        assert_eq!(
            fired,
            vec![
                (1000.0, TimerKind::Spawn),
                (2000.0, TimerKind::Spawn),
                (3000.0, TimerKind::Spawn)
            ]
        );
        assert_eq!(clock.now_ms(), 3500.0);
    }

    #[test]
    fn test_once_fires_once() {
        let mut clock = VirtualClock::new();
        let id = clock.schedule_once(16.0, TimerKind::Frame);
        assert!(clock.is_scheduled(id));
        assert_eq!(drain(&mut clock, 100.0).len(), 1);
        assert!(!clock.is_scheduled(id));
        assert!(clock.is_empty());
    }

    #[test]
    fn test_interleaved_order() {
        let mut clock = VirtualClock::new();
        clock.schedule_repeating(1500.0, TimerKind::Spawn);
        clock.schedule_repeating(1000.0, TimerKind::LevelUp);
        let kinds: Vec<TimerKind> = drain(&mut clock, 3000.0).into_iter().map(|f| f.1).collect();
        assert_eq!(
            kinds,
            vec![
                TimerKind::LevelUp, // 1000
                TimerKind::Spawn,   // 1500
                TimerKind::LevelUp, // 2000
                TimerKind::Spawn,   // 3000, re-armed first
                TimerKind::LevelUp, // 3000
            ]
        );
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut clock = VirtualClock::new();
        let id = clock.schedule_repeating(10.0, TimerKind::Spawn);
        clock.cancel(id);
        clock.cancel(id);
        clock.cancel(TimerId(999));
        assert!(drain(&mut clock, 100.0).is_empty());
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let mut clock = VirtualClock::new();
        clock.schedule_repeating(0.0, TimerKind::Spawn);
        assert_eq!(drain(&mut clock, 5.0).len(), 5);
    }
}
