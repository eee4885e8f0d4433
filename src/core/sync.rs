//! # Synchronization Bookkeeping
//!
//! Decides *when* a snapshot fetch may start and *whether* a finished fetch
//! may be applied. The actual HTTP work happens in a tokio task spawned by
//! the TUI; this module only tracks tokens.
//!
//! ```text
//!   timer fires ──► begin_tick() ──► fetch in flight ──► finish(gen) ──► arm_timer()
//!        ▲              │ busy?                               │              │
//!        │              └─► refresh_requested = true          │              │
//!        └────────────────────────────────────────────────────┴──────────────┘
//! ```
//!
//! Three tokens keep exactly one polling chain alive:
//! - `generation`: which fetch is in flight; other results are stale.
//! - `timer_id`: which armed timer may start the next tick; older timers are
//!   ignored, so a manual refresh never forks a second chain.
//! - `refresh_requested`: a tick asked for while busy, run right after.

use serde::{Deserialize, Serialize};

/// Connection health as seen by the panel.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No snapshot has landed yet.
    #[default]
    Connecting,
    Connected,
    Disconnected { reason: String },
}

impl ConnectionState {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, ConnectionState::Disconnected { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected { .. } => "disconnected",
        }
    }
}

/// What to do after a tick fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconnectPolicy {
    /// Keep polling on schedule, even while disconnected.
    #[default]
    Auto,
    /// Stop polling after a failure until the user asks to reconnect.
    Manual,
}

#[derive(Debug, Default)]
pub struct SyncState {
    generation: u64,
    in_flight: Option<u64>,
    next_timer_id: u64,
    armed_timer: Option<u64>,
    refresh_requested: bool,
}

impl SyncState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a tick if none is in flight, returning its generation.
    ///
    /// When busy, the request is remembered and `None` is returned; the
    /// caller will get a fresh tick from `finish` instead. Starting a tick
    /// disarms any pending timer.
    pub fn begin_tick(&mut self) -> Option<u64> {
        if self.in_flight.is_some() {
            self.refresh_requested = true;
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.armed_timer = None;
        self.refresh_requested = false;
        Some(self.generation)
    }

    /// Marks the in-flight tick as done. Returns false for a stale generation,
    /// in which case nothing changes and the result must be dropped.
    pub fn finish(&mut self, generation: u64) -> bool {
        if self.in_flight != Some(generation) {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// True if a refresh was asked for during the last tick. Clears the flag.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_requested)
    }

    /// Arms the next timer, invalidating any older one.
    pub fn arm_timer(&mut self) -> u64 {
        self.next_timer_id += 1;
        self.armed_timer = Some(self.next_timer_id);
        self.next_timer_id
    }

    /// Consumes a fired timer. Only the most recently armed timer counts.
    pub fn timer_fired(&mut self, timer_id: u64) -> bool {
        if self.armed_timer != Some(timer_id) {
            return false;
        }
        self.armed_timer = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticks_do_not_overlap() {
        let mut sync = SyncState::new();
        let first = sync.begin_tick().expect("idle loop starts a tick");
        assert!(sync.is_fetching());
        assert_eq!(sync.begin_tick(), None, "second tick must wait");
        assert!(sync.finish(first));
        assert!(sync.take_refresh_request(), "busy request is remembered");
        assert!(!sync.take_refresh_request(), "flag is cleared once taken");
    }

    #[test]
    fn test_stale_generation_is_rejected() {
        let mut sync = SyncState::new();
        let first = sync.begin_tick().unwrap();
        assert!(sync.finish(first));
        let second = sync.begin_tick().unwrap();
        assert!(!sync.finish(first), "old generation must not finish the new tick");
        assert!(sync.is_fetching());
        assert!(sync.finish(second));
        assert!(!sync.finish(second), "double finish is a no-op");
    }

    #[test]
    fn test_only_latest_timer_starts_a_tick() {
        let mut sync = SyncState::new();
        let old = sync.arm_timer();
        let new = sync.arm_timer();
        assert!(!sync.timer_fired(old));
        assert!(sync.timer_fired(new));
        assert!(!sync.timer_fired(new), "a timer fires once");
    }

    #[test]
    fn test_manual_tick_disarms_pending_timer() {
        let mut sync = SyncState::new();
        let timer = sync.arm_timer();
        let generation = sync.begin_tick().unwrap();
        assert!(!sync.timer_fired(timer));
        assert!(sync.finish(generation));
    }

    #[test]
    fn test_connection_labels() {
        assert_eq!(ConnectionState::default().label(), "connecting");
        let down = ConnectionState::Disconnected {
            reason: "refused".into(),
        };
        assert!(down.is_disconnected());
        assert_eq!(down.label(), "disconnected");
    }
}
