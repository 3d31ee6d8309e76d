use crate::event::{GatewayMetadata, UplinkEvent};
use crate::timestamp::Timestamp;
use log::debug;

/// A gateway reception time that is precise enough to answer from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub time: Timestamp,
    pub gtw_id: String,
}

/// Collect gateway reception times with sub-second precision, in report order.
///
/// Gateways without a time, with whole-second times, or with times that do
/// not parse are left out.
pub fn collect_candidates(event: &UplinkEvent) -> Vec<Candidate> {
    event
        .metadata
        .gateways
        .iter()
        .filter_map(|gw| candidate_from(&event.dev_id, gw))
        .collect()
}

fn candidate_from(dev_id: &str, gw: &GatewayMetadata) -> Option<Candidate> {
    let text = match gw.time.as_deref() {
        Some(t) => t,
        None => {
            debug!("[{}] Gateway {} reported no time", dev_id, gw.gtw_id);
            return None;
        }
    };

    let time = match Timestamp::parse(text) {
        Ok(t) => t,
        Err(e) => {
            debug!("[{}] Gateway {}: {}", dev_id, gw.gtw_id, e);
            return None;
        }
    };

    if !time.is_sub_second() {
        debug!(
            "[{}] Gateway {} time '{}' has no sub-second part, skipping",
            dev_id, gw.gtw_id, text
        );
        return None;
    }

    Some(Candidate {
        time,
        gtw_id: gw.gtw_id.clone(),
    })
}

/// The network server's reception time, if present and parseable.
pub fn server_time(event: &UplinkEvent) -> Option<Timestamp> {
    match Timestamp::parse(&event.metadata.time) {
        Ok(t) => Some(t),
        Err(e) => {
            debug!("[{}] No usable server time: {}", event.dev_id, e);
            None
        }
    }
}
