//! Decode a timeserver answer payload the way the device sees it.
//!
//! Usage: `timeanswer 055D972DF17D` or `timeanswer BV2XLfF9`.
//! Without `--hex` or `--base64` the encoding is picked by length: an answer
//! is 12 hex digits (2 for the `FF` sentinel), everything else is base64.

use anyhow::{anyhow, Result};
use base64::Engine as _;
use chrono::DateTime;
use clap::{Parser, ValueEnum};

use lorawan_timeserver::answer::{AnswerPayload, ANSWER_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about = "Decode a LoRaWAN timeserver answer payload")]
struct Args {
    /// Payload as hex (e.g. 055D972DF17D) or base64 (e.g. BV2XLfF9)
    payload: String,

    /// Force the payload encoding instead of guessing it from the length
    #[arg(short, long, value_enum)]
    encoding: Option<Encoding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Encoding {
    Hex,
    Base64,
}

/// Hex only when the text has exactly the hex length of an answer or of the sentinel.
fn guess_encoding(text: &str) -> Encoding {
    let hex_len = text.len() == ANSWER_SIZE * 2 || text.len() == 2;
    if hex_len && text.chars().all(|c| c.is_ascii_hexdigit()) {
        Encoding::Hex
    } else {
        Encoding::Base64
    }
}

fn decode_payload(text: &str, encoding: Option<Encoding>) -> Result<Vec<u8>> {
    let text = text.trim();
    match encoding.unwrap_or_else(|| guess_encoding(text)) {
        Encoding::Hex => hex::decode(text).map_err(|e| anyhow!("Invalid hex payload: {}", e)),
        Encoding::Base64 => base64::engine::general_purpose::STANDARD
            .decode(text)
            .map_err(|e| anyhow!("Invalid base64 payload: {}", e)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let bytes = decode_payload(&args.payload, args.encoding)?;

    match AnswerPayload::parse(&bytes)? {
        AnswerPayload::Unavailable => {
            println!("Timeserver had no valid gateway time (0xFF)");
        }
        AnswerPayload::Time(answer) => {
            let utc = DateTime::from_timestamp_millis(answer.to_unix_millis())
                .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
                .unwrap_or_else(|| "out of range".to_string());

            println!("Sequence:    {}", answer.seq_no);
            println!("Seconds:     {}", answer.seconds);
            println!("Fraction:    {}/250 s", answer.fraction);
            println!("UTC:         {}", utc);
            println!("GPS seconds: {}", answer.gps_seconds());
        }
    }

    Ok(())
}
