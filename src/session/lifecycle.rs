use std::sync::atomic::{AtomicU8, Ordering};

/// Where a session is in its life.
///
/// `Created -> Active -> Closing -> Closed`. A session that fails its
/// handshake goes straight from `Created` to `Closing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    Created = 0,
    Active = 1,
    Closing = 2,
    Closed = 3,
}

impl SessionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Created,
            1 => Self::Active,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// Lock-free state machine guarding the transitions above.
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self {
            state: AtomicU8::new(SessionState::Created as u8),
        }
    }
}

impl Lifecycle {
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// `Created -> Active`. Returns false from any other state.
    pub fn activate(&self) -> bool {
        self.transition(SessionState::Created, SessionState::Active)
    }

    /// Enter `Closing` from `Created` or `Active`.
    ///
    /// Exactly one caller wins; everyone else gets false and must not tear
    /// the session down again.
    pub fn begin_close(&self) -> bool {
        self.transition(SessionState::Active, SessionState::Closing)
            || self.transition(SessionState::Created, SessionState::Closing)
    }

    /// `Closing -> Closed`.
    pub fn finish_close(&self) -> bool {
        self.transition(SessionState::Closing, SessionState::Closed)
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}
