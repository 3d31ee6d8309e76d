//! Answering a single time sync request.
//!
//! [`process`] takes one uplink through validation, gateway time selection
//! and answer encoding. It keeps no state between calls. For every request it
//! answers, the result always maps to five outbound messages in a fixed order:
//!
//! 1. selected gateway id, or `"n/a"`
//! 2. clock offset in milliseconds, or `"n/a"`
//! 3. device id
//! 4. sequence number
//! 5. the answer downlink on the answer port

use base64::Engine as _;
use log::{info, warn};
use serde::Serialize;
use serde_json::{json, Value};

use crate::answer::{AnswerPayload, TimeSyncAnswer};
use crate::config::TimeserverConfig;
use crate::event::UplinkEvent;
use crate::gateway::{collect_candidates, server_time};
use crate::request::TimeSyncRequest;
use crate::selector::select;
use crate::timestamp::ClockOffset;

/// Sentinel for diagnostics that have no value.
pub const NOT_AVAILABLE: &str = "n/a";

/// Downlink carrying the answer back to the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Downlink {
    pub dev_id: String,
    pub port: u8,
    pub confirmed: bool,
    pub payload: AnswerPayload,
}

/// Outcome of one answered request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeSyncResult {
    pub selected_gateway: Option<String>,
    pub offset: Option<ClockOffset>,
    pub dev_id: String,
    pub seq_no: u8,
    pub downlink: Downlink,
}

/// One message for the host routing runtime.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutboundMessage {
    Diagnostic {
        payload: Value,
    },
    Downlink {
        dev_id: String,
        port: u8,
        confirmed: bool,
        payload_raw: String,
    },
}

impl TimeSyncResult {
    pub fn is_available(&self) -> bool {
        matches!(self.downlink.payload, AnswerPayload::Time(_))
    }

    /// The five outbound messages, in wiring order.
    pub fn messages(&self) -> [OutboundMessage; 5] {
        let gateway = match &self.selected_gateway {
            Some(id) => json!(id),
            None => json!(NOT_AVAILABLE),
        };
        let offset = match &self.offset {
            Some(o) => json!(o.as_millis()),
            None => json!(NOT_AVAILABLE),
        };

        [
            OutboundMessage::Diagnostic { payload: gateway },
            OutboundMessage::Diagnostic { payload: offset },
            OutboundMessage::Diagnostic {
                payload: json!(self.dev_id),
            },
            OutboundMessage::Diagnostic {
                payload: json!(self.seq_no),
            },
            OutboundMessage::Downlink {
                dev_id: self.downlink.dev_id.clone(),
                port: self.downlink.port,
                confirmed: self.downlink.confirmed,
                payload_raw: base64::engine::general_purpose::STANDARD
                    .encode(self.downlink.payload.to_bytes()),
            },
        ]
    }
}

/// Answer one uplink. `None` means the uplink must not be answered at all.
pub fn process(event: &UplinkEvent, config: &TimeserverConfig) -> Option<TimeSyncResult> {
    let request = TimeSyncRequest::from_event(event, config)?;

    let candidates = collect_candidates(event);
    let selection = server_time(event).and_then(|server| select(&candidates, &server, config));

    let downlink = |payload: AnswerPayload| Downlink {
        dev_id: request.dev_id.clone(),
        port: config.answer_port,
        confirmed: config.confirmed_downlink,
        payload,
    };

    let result = match selection {
        Some(sel) => {
            let answer = TimeSyncAnswer::new(request.seq_no, &sel.candidate.time);
            info!(
                "[{}] Timesync #{}: gateway {} at {} (offset {})",
                request.dev_id, request.seq_no, sel.candidate.gtw_id, sel.candidate.time, sel.offset
            );
            TimeSyncResult {
                selected_gateway: Some(sel.candidate.gtw_id),
                offset: Some(sel.offset),
                dev_id: request.dev_id.clone(),
                seq_no: request.seq_no,
                downlink: downlink(AnswerPayload::Time(answer)),
            }
        }
        None => {
            warn!(
                "[{}] Timesync #{}: no valid gateway timestamp among {} candidate(s)",
                request.dev_id,
                request.seq_no,
                candidates.len()
            );
            TimeSyncResult {
                selected_gateway: None,
                offset: None,
                dev_id: request.dev_id.clone(),
                seq_no: request.seq_no,
                downlink: downlink(AnswerPayload::Unavailable),
            }
        }
    };

    Some(result)
}
