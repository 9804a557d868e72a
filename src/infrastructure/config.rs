use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    /// Capacity of the change-event channel. Subscribers that fall further
    /// behind than this observe a lag and should re-read the entries they
    /// care about.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            event_capacity: default_event_capacity(),
        }
    }
}

// Defaults
fn default_event_capacity() -> usize {
    256
}
