use std::collections::VecDeque;
use std::time::Duration;

/// Default CoDel target sojourn time before the queue starts shedding (§4.3).
pub const DEFAULT_TARGET: Duration = Duration::from_millis(5);
/// Default CoDel measurement interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

struct Entry<T> {
    item: T,
    enqueued_at: u64,
}

/// A per-session outbound queue that drops the oldest entry once it has been over `target` age
/// continuously for `interval` (§4.3's CoDel-like flow control). Callers drive the clock
/// themselves by passing `now` (monotonic milliseconds) into `push`/`pop`, since the workspace
/// avoids `Instant::now()` calls inside pure logic for testability.
pub struct CodelQueue<T> {
    items: VecDeque<Entry<T>>,
    capacity: usize,
    target: Duration,
    interval: Duration,
    first_above_target: Option<u64>,
}

impl<T> CodelQueue<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
            target: DEFAULT_TARGET,
            interval: DEFAULT_INTERVAL,
            first_above_target: None,
        }
    }

    pub fn with_params(capacity: usize, target: Duration, interval: Duration) -> Self {
        Self { items: VecDeque::new(), capacity, target, interval, first_above_target: None }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Enqueue `item`. If the queue is at capacity, drop the oldest entry to make room
    /// (§4.3: "drops oldest messages when the queue is full").
    pub fn push(&mut self, item: T, now_ms: u64) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(Entry { item, enqueued_at: now_ms });
    }

    /// Dequeue the oldest item, applying CoDel: if the head's sojourn time has been continuously
    /// above `target` for longer than `interval`, drop it instead of returning it.
    pub fn pop(&mut self, now_ms: u64) -> Option<T> {
        loop {
            let sojourn = {
                let head = self.items.front()?;
                now_ms.saturating_sub(head.enqueued_at)
            };

            if sojourn <= self.target.as_millis() as u64 {
                self.first_above_target = None;
                return self.items.pop_front().map(|e| e.item);
            }

            match self.first_above_target {
                None => {
                    self.first_above_target = Some(now_ms);
                    return self.items.pop_front().map(|e| e.item);
                }
                Some(since) if now_ms.saturating_sub(since) < self.interval.as_millis() as u64 => {
                    return self.items.pop_front().map(|e| e.item);
                }
                Some(_) => {
                    // Sustained congestion: shed the head and re-check the new head immediately.
                    self.items.pop_front();
                    self.first_above_target = Some(now_ms);
                }
            }
        }
    }
}
