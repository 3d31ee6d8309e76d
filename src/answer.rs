//! Timeserver answer payload.
//!
//! **Answer:** 6 bytes
//! - `[0]`   Sequence number (echo of the request)
//! - `[1-4]` Seconds (u32, big-endian)
//! - `[5]`   Fraction of the second in 1/250 s units
//!
//! **Unavailable:** 1 byte, `0xFF`. Sent when no gateway time could be trusted.
//!
//! The seconds field carries Unix seconds; the device subtracts
//! [`GPS_UTC_DIFF`] itself to get to its GPS based clock.

use anyhow::{anyhow, Result};
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::Cursor;

use crate::timestamp::Timestamp;

/// Answer packet size
pub const ANSWER_SIZE: usize = 6;

/// Single byte sent when no time is available
pub const UNAVAILABLE: u8 = 0xFF;

/// Seconds between the Unix epoch and the GPS epoch (1980-01-06), leap seconds not applied.
pub const GPS_UTC_DIFF: u32 = 315_964_800;

/// Milliseconds per fraction unit (1/250 s).
const MS_PER_FRACTION: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSyncAnswer {
    pub seq_no: u8,
    pub seconds: u32,
    pub fraction: u8,
}

impl TimeSyncAnswer {
    /// Build the answer for `time`. Seconds past 2106 wrap, as they would on the device.
    pub fn new(seq_no: u8, time: &Timestamp) -> Self {
        let millis = time.millis();
        let seconds = millis.div_euclid(1000) as u32;
        // remainder is 0..=999, so the fraction is 0..=249
        let fraction = (millis.rem_euclid(1000) / MS_PER_FRACTION) as u8;

        TimeSyncAnswer {
            seq_no,
            seconds,
            fraction,
        }
    }

    pub fn to_bytes(&self) -> [u8; ANSWER_SIZE] {
        let mut buf = [0u8; ANSWER_SIZE];
        buf[0] = self.seq_no;
        BigEndian::write_u32(&mut buf[1..5], self.seconds);
        buf[5] = self.fraction;
        buf
    }

    /// Decode an answer the way the device firmware does.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < ANSWER_SIZE {
            return Err(anyhow!(
                "Answer too short: {} bytes, expected {}",
                data.len(),
                ANSWER_SIZE
            ));
        }
        let mut rdr = Cursor::new(data);

        let seq_no = rdr.read_u8()?;
        let seconds = rdr.read_u32::<BigEndian>()?;
        let fraction = rdr.read_u8()?;

        Ok(TimeSyncAnswer {
            seq_no,
            seconds,
            fraction,
        })
    }

    pub fn to_unix_millis(&self) -> i64 {
        i64::from(self.seconds) * 1000 + i64::from(self.fraction) * MS_PER_FRACTION
    }

    pub fn gps_seconds(&self) -> u32 {
        self.seconds.wrapping_sub(GPS_UTC_DIFF)
    }
}

/// What goes out on the answer port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPayload {
    Time(TimeSyncAnswer),
    Unavailable,
}

impl AnswerPayload {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            AnswerPayload::Time(answer) => answer.to_bytes().to_vec(),
            AnswerPayload::Unavailable => vec![UNAVAILABLE],
        }
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        match data {
            [UNAVAILABLE] => Ok(AnswerPayload::Unavailable),
            _ => Ok(AnswerPayload::Time(TimeSyncAnswer::parse(data)?)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
