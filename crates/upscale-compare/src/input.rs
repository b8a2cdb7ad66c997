//! Input snapshots and process-level cancellation

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// A discrete input the host can report as held down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Number row key `0`-`9`
    Digit(u8),
    Escape,
    /// Back button of the first game controller
    GamepadBack,
    /// Any other key, identified by a host-specific code
    Other(u32),
}

/// Keys held down during one input-processing step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    keys_down: HashSet<Key>,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn press(&mut self, key: Key) {
        self.keys_down.insert(key);
    }

    pub fn release(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    /// Returns true if a designated quit input is held
    pub fn is_cancel_requested(&self) -> bool {
        self.is_key_down(Key::Escape) || self.is_key_down(Key::GamepadBack)
    }
}

impl FromIterator<Key> for InputSnapshot {
    fn from_iter<T: IntoIterator<Item = Key>>(iter: T) -> Self {
        Self {
            keys_down: iter.into_iter().collect(),
        }
    }
}

/// Shared flag asking the frame loop to stop
///
/// Cloned into signal handlers or other threads; the frame loop only reads it once per frame.
#[derive(Debug, Clone, Default)]
pub struct ExitSignal(Arc<AtomicBool>);

impl ExitSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
