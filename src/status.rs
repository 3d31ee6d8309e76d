use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerStats {
    pub received: u64,
    pub malformed: u64,
    pub dropped: u64,     // not a time sync request, or end of handshake
    pub answered: u64,
    pub unavailable: u64, // answered with the 0xFF sentinel
}

impl ServerStats {
    pub fn answered_total(&self) -> u64 {
        self.answered + self.unavailable
    }
}
