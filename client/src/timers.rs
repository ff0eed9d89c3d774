use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub const COUNTDOWN_SECONDS: u32 = 5;
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// `remaining` counts down to 0; 0 means the countdown expired.
    CountdownTick { generation: u64, remaining: u32 },
    NotificationExpired { generation: u64 },
}

/// At most one running task. Restarting aborts the previous task and bumps the
/// generation so events it already queued are recognised as stale.
#[derive(Debug, Default)]
pub struct TimerSlot {
    generation: u64,
    handle: Option<JoinHandle<()>>,
}

impl TimerSlot {
    pub fn restart<F, Fut>(&mut self, task: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        self.handle = Some(tokio::spawn(task(self.generation)));
        self.generation
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Mark the running task as done without aborting it.
    pub fn finish(&mut self) {
        self.handle = None;
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.is_active() && self.generation == generation
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TimerSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Emits ticks for `COUNTDOWN_SECONDS - 1` down to 0, one per second. The
/// starting value is shown by the caller immediately.
pub async fn countdown(generation: u64, tx: UnboundedSender<TimerEvent>) {
    for remaining in (0..COUNTDOWN_SECONDS).rev() {
        tokio::time::sleep(COUNTDOWN_TICK).await;
        if tx
            .send(TimerEvent::CountdownTick { generation, remaining })
            .is_err()
        {
            return;
        }
    }
}

pub async fn dismiss_after(generation: u64, ttl: Duration, tx: UnboundedSender<TimerEvent>) {
    tokio::time::sleep(ttl).await;
    let _ = tx.send(TimerEvent::NotificationExpired { generation });
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn countdown_ticks_once_per_second() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::default();
        let generation = slot.restart(|g| countdown(g, tx));

        let mut seen = Vec::new();
        while let Some(TimerEvent::CountdownTick { generation: g, remaining }) = rx.recv().await {
            assert_eq!(g, generation);
            seen.push(remaining);
        }
        assert_eq!(seen, vec![4, 3, 2, 1, 0]);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_cancels_the_previous_task() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::default();
        let first = slot.restart(|g| countdown(g, tx.clone()));
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let second = slot.restart(|g| countdown(g, tx.clone()));
        drop(tx);

        assert!(!slot.is_current(first));
        assert!(slot.is_current(second));

        let mut from_first = 0;
        let mut from_second = 0;
        while let Ok(Some(ev)) =
            tokio::time::timeout(Duration::from_secs(10), rx.recv()).await
        {
            match ev {
                TimerEvent::CountdownTick { generation, .. } if generation == first => {
                    from_first += 1
                }
                TimerEvent::CountdownTick { generation, .. } if generation == second => {
                    from_second += 1
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(from_first, 1);
        assert_eq!(from_second, COUNTDOWN_SECONDS as usize);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_expires_after_ttl() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut slot = TimerSlot::default();
        let generation = slot.restart(|g| dismiss_after(g, NOTIFICATION_TTL, tx));
        let start = tokio::time::Instant::now();
        assert_eq!(rx.recv().await, Some(TimerEvent::NotificationExpired { generation }));
        assert!(start.elapsed() >= NOTIFICATION_TTL);
    }
}
