use crate::config::TimeserverConfig;
use crate::event::UplinkEvent;
use log::debug;

/// A node's request for the current time, one of a numbered handshake series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSyncRequest {
    pub seq_no: u8,
    pub dev_id: String,
}

impl TimeSyncRequest {
    /// Accept the uplink only if it is a single-byte time sync request.
    ///
    /// Anything else, including the end-of-handshake marker, yields `None`
    /// and must not be answered.
    pub fn from_event(event: &UplinkEvent, config: &TimeserverConfig) -> Option<Self> {
        let payload = match event.payload_raw.to_bytes() {
            Ok(p) => p,
            Err(e) => {
                debug!("[{}] Undecodable payload, ignoring: {}", event.dev_id, e);
                return None;
            }
        };

        Self::from_payload(&payload, &event.dev_id, config)
    }

    pub fn from_payload(payload: &[u8], dev_id: &str, config: &TimeserverConfig) -> Option<Self> {
        let seq_no = match payload {
            [seq_no] => *seq_no,
            _ => {
                debug!(
                    "[{}] Payload length {} is not a time sync request, ignoring",
                    dev_id,
                    payload.len()
                );
                return None;
            }
        };

        if seq_no == config.end_of_sync_seq_no {
            debug!("[{}] End of time sync handshake (seq {})", dev_id, seq_no);
            return None;
        }

        Some(TimeSyncRequest {
            seq_no,
            dev_id: dev_id.to_string(),
        })
    }
}
