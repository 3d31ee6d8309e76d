use anyhow::Result;

use crate::event::UplinkEvent;
use crate::timeserver::TimeSyncResult;

/// One item read from the uplink feed.
#[derive(Debug, Clone)]
pub enum Inbound {
    Event(UplinkEvent),
    /// Input that could not be decoded as an uplink, with the reason.
    Malformed(String),
}

#[cfg_attr(test, mockall::automock)]
pub trait UplinkSource {
    /// Read the next uplink. Returns Ok(None) at end of stream.
    /// Errors are fatal to the feed; undecodable input is returned as `Inbound::Malformed`.
    fn next_event(&mut self) -> Result<Option<Inbound>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait DownlinkSink {
    /// Hand the five outbound messages of an answered request to the host runtime.
    fn emit(&mut self, result: &TimeSyncResult) -> Result<()>;
}
