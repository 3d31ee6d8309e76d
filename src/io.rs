//! Newline-delimited JSON transport between the host runtime and the timeserver.
//!
//! Each input line holds one uplink event. For each answered request one
//! output line is written: a JSON array of the five outbound messages.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::event::UplinkEvent;
use crate::timeserver::TimeSyncResult;
use crate::traits::{DownlinkSink, Inbound, UplinkSource};

pub struct JsonLinesSource<R: BufRead> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource { reader, line_no: 0 }
    }
}

impl<R: BufRead> UplinkSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Result<Option<Inbound>> {
        let mut line = String::new();
        loop {
            line.clear();
            let n = self
                .reader
                .read_line(&mut line)
                .context("Failed to read uplink feed")?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Ok(Some(match UplinkEvent::from_json(trimmed) {
                Ok(event) => Inbound::Event(event),
                Err(e) => Inbound::Malformed(format!("line {}: {}", self.line_no, e)),
            }));
        }
    }
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> DownlinkSink for JsonLinesSink<W> {
    fn emit(&mut self, result: &TimeSyncResult) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &result.messages())
            .context("Failed to encode outbound messages")?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
