use anyhow::Result;
use log::{debug, info, warn};
use std::time::{Duration, Instant};

use crate::config::TimeserverConfig;
use crate::status::ServerStats;
use crate::timeserver::process;
use crate::traits::{DownlinkSink, Inbound, UplinkSource};

const STATUS_LOG_INTERVAL: Duration = Duration::from_secs(60);

pub struct TimeserverController<S, K>
where
    S: UplinkSource,
    K: DownlinkSink,
{
    source: S,
    sink: K,
    config: TimeserverConfig,
    stats: ServerStats,
    last_log: Instant,
}

impl<S, K> TimeserverController<S, K>
where
    S: UplinkSource,
    K: DownlinkSink,
{
    pub fn new(source: S, sink: K, config: TimeserverConfig) -> Self {
        TimeserverController {
            source,
            sink,
            config,
            stats: ServerStats::default(),
            last_log: Instant::now(),
        }
    }

    pub fn stats(&self) -> &ServerStats {
        &self.stats
    }

    pub fn log_status(&self) {
        info!(
            "[Status] received={} answered={} unavailable={} dropped={} malformed={}",
            self.stats.received,
            self.stats.answered,
            self.stats.unavailable,
            self.stats.dropped,
            self.stats.malformed
        );
    }

    /// Handle one item from the feed. Returns Ok(false) once the feed is exhausted.
    pub fn process_loop_iteration(&mut self) -> Result<bool> {
        let event = match self.source.next_event()? {
            Some(Inbound::Event(ev)) => ev,
            Some(Inbound::Malformed(reason)) => {
                self.stats.malformed += 1;
                warn!("Skipping undecodable uplink: {}", reason);
                return Ok(true);
            }
            None => return Ok(false),
        };
        self.stats.received += 1;

        let result = match process(&event, &self.config) {
            Some(r) => r,
            None => {
                self.stats.dropped += 1;
                return Ok(true);
            }
        };

        if result.is_available() {
            self.stats.answered += 1;
        } else {
            self.stats.unavailable += 1;
        }

        self.sink.emit(&result)?;
        debug!("[{}] Answer #{} dispatched", result.dev_id, result.seq_no);

        Ok(true)
    }

    /// Drain the feed, then return the final counters.
    pub fn run(&mut self) -> Result<ServerStats> {
        while self.process_loop_iteration()? {
            if self.last_log.elapsed() >= STATUS_LOG_INTERVAL {
                self.log_status();
                self.last_log = Instant::now();
            }
        }

        info!("Uplink feed closed.");
        self.log_status();
        Ok(self.stats.clone())
    }
}
