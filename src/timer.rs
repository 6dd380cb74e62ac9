//! Timer subsystem.
//!
//! Scripts may arm one-shot timers and periodic ticks, identified by ids
//! 1..=254. Each armed timer is a spawned task that sleeps and then records
//! its id in a shared active slot; the host's delivery loop reads and
//! clears the slot between script evaluations. The slot holds one id, so
//! expiries that land between reads coalesce, last writer wins.
//!
//! Arming an already-armed id cancels the previous instance first, making
//! re-arm idempotent. Arming needs an ambient tokio runtime; without one
//! the operation reports `Unsupported` instead of arming.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};

use crate::error::EvalError;

/// Largest usable timer id; 0 means "no timer" in the active slot.
pub const MAX_TIMER_ID: u16 = 254;

/// The set of armed timers plus the shared active-timer slot.
#[derive(Debug, Default)]
pub struct TimerTable {
    armed: HashMap<u16, JoinHandle<()>>,
    active: Arc<AtomicU16>,
}

impl TimerTable {
    pub fn new() -> TimerTable {
        TimerTable::default()
    }

    fn check_id(id: u16) -> Result<(), EvalError> {
        if id == 0 || id > MAX_TIMER_ID {
            return Err(EvalError::NotFound(format!("timer id {id}")));
        }
        Ok(())
    }

    fn cancel(&mut self, id: u16) {
        if let Some(handle) = self.armed.remove(&id) {
            handle.abort();
        }
    }

    fn runtime(op: &'static str) -> Result<Handle, EvalError> {
        Handle::try_current().map_err(|_| EvalError::Unsupported(op))
    }

    /// Arm a one-shot timer. Re-arming an armed id cancels the previous
    /// instance first.
    pub fn create_timer(&mut self, id: u16, delay_ms: u32) -> Result<(), EvalError> {
        Self::check_id(id)?;
        let rt = Self::runtime("CreateTimer")?;
        self.cancel(id);
        let active = Arc::clone(&self.active);
        let handle = rt.spawn(async move {
            sleep(Duration::from_millis(u64::from(delay_ms))).await;
            active.store(id, Ordering::SeqCst);
        });
        self.armed.insert(id, handle);
        Ok(())
    }

    /// Arm a periodic tick firing every `period_ms` until deleted.
    pub fn create_tick(&mut self, id: u16, period_ms: u32) -> Result<(), EvalError> {
        Self::check_id(id)?;
        if period_ms == 0 {
            return Err(EvalError::InvalidArgument);
        }
        let rt = Self::runtime("CreateTick")?;
        self.cancel(id);
        let active = Arc::clone(&self.active);
        let period = Duration::from_millis(u64::from(period_ms));
        let handle = rt.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                active.store(id, Ordering::SeqCst);
            }
        });
        self.armed.insert(id, handle);
        Ok(())
    }

    /// Disarm a timer or tick. An id that is not armed reports `NotFound`.
    pub fn delete_timer(&mut self, id: u16) -> Result<(), EvalError> {
        Self::check_id(id)?;
        match self.armed.remove(&id) {
            Some(handle) => {
                handle.abort();
                Ok(())
            }
            None => Err(EvalError::NotFound(format!("timer id {id}"))),
        }
    }

    /// The most recently expired timer id, or 0 when none is pending.
    pub fn active_timer(&self) -> u16 {
        self.active.load(Ordering::SeqCst)
    }

    /// Record a delivered timer id; 0 clears the slot. This is the hook the
    /// host's delivery boundary uses after consuming an expiry.
    pub fn set_active(&self, id: u16) {
        self.active.store(id, Ordering::SeqCst);
    }

    pub fn is_armed(&self, id: u16) -> bool {
        self.armed.contains_key(&id)
    }
}

impl Drop for TimerTable {
    fn drop(&mut self) {
        for handle in self.armed.values() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    /// Let a freshly spawned timer task reach its first await, so its
    /// deadline is registered before the paused clock moves.
    async fn settle() {
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn one_shot_fires_once() {
        let mut timers = TimerTable::new();
        timers.create_timer(5, 100).unwrap();
        settle().await;
        assert_eq!(timers.active_timer(), 0);

        advance(Duration::from_millis(101)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 5);

        timers.set_active(0);
        advance(Duration::from_millis(500)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn tick_fires_repeatedly() {
        let mut timers = TimerTable::new();
        timers.create_tick(3, 50).unwrap();
        settle().await;

        advance(Duration::from_millis(51)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 3);

        timers.set_active(0);
        advance(Duration::from_millis(51)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn rearm_cancels_previous_instance() {
        let mut timers = TimerTable::new();
        timers.create_timer(7, 100).unwrap();
        settle().await;
        advance(Duration::from_millis(50)).await;

        // Re-arm; the original deadline must no longer fire.
        timers.create_timer(7, 100).unwrap();
        settle().await;
        advance(Duration::from_millis(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 0);

        advance(Duration::from_millis(50)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 7);
    }

    #[tokio::test(start_paused = true)]
    async fn expiries_coalesce_last_writer_wins() {
        let mut timers = TimerTable::new();
        timers.create_timer(1, 10).unwrap();
        timers.create_timer(2, 20).unwrap();
        settle().await;

        advance(Duration::from_millis(25)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_disarms() {
        let mut timers = TimerTable::new();
        timers.create_tick(9, 10).unwrap();
        timers.delete_timer(9).unwrap();
        assert!(!timers.is_armed(9));

        advance(Duration::from_millis(100)).await;
        tokio::task::yield_now().await;
        assert_eq!(timers.active_timer(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn delete_unarmed_reports_not_found() {
        let mut timers = TimerTable::new();
        assert_eq!(
            timers.delete_timer(4),
            Err(EvalError::NotFound("timer id 4".into()))
        );
    }

    #[test]
    fn arming_without_a_runtime_is_an_error() {
        let mut timers = TimerTable::new();
        assert_eq!(
            timers.create_timer(3, 100),
            Err(EvalError::Unsupported("CreateTimer"))
        );
        assert_eq!(
            timers.create_tick(3, 100),
            Err(EvalError::Unsupported("CreateTick"))
        );
        assert!(!timers.is_armed(3));
    }

    #[tokio::test(start_paused = true)]
    async fn id_range_is_enforced() {
        let mut timers = TimerTable::new();
        assert!(matches!(
            timers.create_timer(0, 10),
            Err(EvalError::NotFound(_))
        ));
        assert!(matches!(
            timers.create_timer(255, 10),
            Err(EvalError::NotFound(_))
        ));
        assert!(timers.create_timer(MAX_TIMER_ID, 10).is_ok());
    }
}
