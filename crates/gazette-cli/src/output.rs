use std::io::Write;

use gazette_core::CacheMode;
use serde::Serialize;
use serde_json::Value;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::CliError;

/// JSON document printed on stdout for every command.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub meta: Meta,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct Meta {
    pub command: &'static str,
    pub cache: CacheMode,
    pub latency_ms: u64,
    pub generated_at: String,
}

impl Meta {
    pub fn new(command: &'static str, cache: CacheMode, latency_ms: u64) -> Result<Self, CliError> {
        let generated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .map_err(|error| CliError::Command(format!("timestamp formatting failed: {error}")))?;
        Ok(Self {
            command,
            cache,
            latency_ms,
            generated_at,
        })
    }
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    write_json(&mut stdout, envelope, pretty)
}

fn write_json<W: Write>(writer: &mut W, envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, envelope)?;
    } else {
        serde_json::to_writer(&mut *writer, envelope)?;
    }
    writeln!(writer)?;
    Ok(())
}
