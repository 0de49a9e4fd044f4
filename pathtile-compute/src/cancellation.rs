use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Trait for checking if rendering should stop
pub trait CancellationChecker: Clone + Send + Sync {
    /// Returns true if workers should stop picking up work right away
    fn is_cancelled(&self) -> bool;

    /// Returns true if no further pass should be started
    fn stop_after_pass(&self) -> bool {
        self.is_cancelled()
    }
}

/// Never cancels - for tests and non-interactive renders
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancellationChecker for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ControlState {
    Running = 0,
    Paused = 1,
    /// Finish the pass in flight so the buffer stays uniformly sampled.
    Cancel = 2,
    /// Stop workers between batches, leaving the pass partially rendered.
    QuickCancel = 3,
}

impl ControlState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ControlState::Paused,
            2 => ControlState::Cancel,
            3 => ControlState::QuickCancel,
            _ => ControlState::Running,
        }
    }
}

/// Shared stop/pause switch between the controlling thread and a session.
#[derive(Clone, Debug, Default)]
pub struct SessionControl {
    state: Arc<AtomicU8>,
}

impl SessionControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControlState {
        ControlState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Request a stop; `quick` abandons the pass in flight.
    ///
    /// States only move up: a cancel ends a pause and a quick cancel is
    /// never downgraded by a later normal cancel.
    pub fn cancel(&self, quick: bool) {
        let target = if quick {
            ControlState::QuickCancel
        } else {
            ControlState::Cancel
        };
        self.state.fetch_max(target as u8, Ordering::AcqRel);
    }

    /// Pause or resume between passes. Ignored once cancelled.
    pub fn set_pause(&self, pause: bool) {
        let (from, to) = if pause {
            (ControlState::Running, ControlState::Paused)
        } else {
            (ControlState::Paused, ControlState::Running)
        };
        let _ = self.state.compare_exchange(
            from as u8,
            to as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    pub fn is_paused(&self) -> bool {
        self.state() == ControlState::Paused
    }
}

impl CancellationChecker for SessionControl {
    fn is_cancelled(&self) -> bool {
        self.state() == ControlState::QuickCancel
    }

    fn stop_after_pass(&self) -> bool {
        matches!(
            self.state(),
            ControlState::Cancel | ControlState::QuickCancel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_never_cancel_always_returns_false() {
        let checker = NeverCancel;
        assert!(!checker.is_cancelled());
        assert!(!checker.stop_after_pass());
    }

    #[test]
    fn test_normal_cancel_lets_pass_finish() {
        let control = SessionControl::new();
        control.cancel(false);

        assert!(!control.is_cancelled());
        assert!(control.stop_after_pass());
    }

    #[test]
    fn test_quick_cancel_stops_workers() {
        let control = SessionControl::new();
        control.cancel(true);

        assert!(control.is_cancelled());
        assert!(control.stop_after_pass());
    }

    #[test]
    fn test_quick_cancel_not_downgraded() {
        let control = SessionControl::new();
        control.cancel(true);
        control.cancel(false);
        assert_eq!(control.state(), ControlState::QuickCancel);
    }

    #[test]
    fn test_pause_and_resume() {
        let control = SessionControl::new();
        control.set_pause(true);
        assert!(control.is_paused());
        assert!(!control.stop_after_pass());

        control.set_pause(false);
        assert_eq!(control.state(), ControlState::Running);
    }

    #[test]
    fn test_cancel_while_paused() {
        let control = SessionControl::new();
        control.set_pause(true);
        control.cancel(false);
        assert_eq!(control.state(), ControlState::Cancel);

        // Pausing a cancelled session does nothing.
        control.set_pause(true);
        assert_eq!(control.state(), ControlState::Cancel);
    }

    #[test]
    fn test_control_cloneable() {
        let control1 = SessionControl::new();
        let control2 = control1.clone();

        control1.cancel(true);
        assert!(control2.is_cancelled());
    }
}
