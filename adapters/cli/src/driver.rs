//! Line-oriented tick loop between the engine and the orchestrator.

use std::{
    io::{BufRead, Write},
    str,
};

use anyhow::{Context, Result};
use log::{debug, error, warn};
use tidebot_core::{ActionBatch, Snapshot};
use tidebot_system_orchestrator::BotOrchestrator;
use tidebot_wire::{decode_snapshot, encode_batch, EMPTY_BATCH};

/// Answers every input line with exactly one encoded batch.
///
/// A line that cannot be decoded is answered with an empty batch so the
/// engine never waits on a missing response. Only I/O failures end the loop.
pub(crate) fn run<R, W>(orchestrator: &mut BotOrchestrator, mut input: R, mut output: W) -> Result<()>
where
    R: BufRead,
    W: Write,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        let read = input
            .read_until(b'\n', &mut line)
            .context("failed to read snapshot from input")?;
        if read == 0 {
            return Ok(());
        }

        let batch = match decode_line(&line) {
            Ok(snapshot) => {
                let batch = orchestrator.run_tick(&snapshot);
                log_tick(orchestrator, &batch);
                batch
            }
            Err(decode_error) => {
                warn!("answering undecodable snapshot with an empty batch: {decode_error:#}");
                ActionBatch::new()
            }
        };

        let encoded = encode_batch(&batch).unwrap_or_else(|encode_error| {
            error!("failed to encode batch, sending an empty one: {encode_error}");
            EMPTY_BATCH.to_owned()
        });
        writeln!(output, "{encoded}").context("failed to write batch to output")?;
        output.flush().context("failed to flush output")?;
    }
}

fn decode_line(line: &[u8]) -> Result<Snapshot> {
    let text = str::from_utf8(line).context("snapshot line is not valid UTF-8")?;
    Ok(decode_snapshot(text)?)
}

fn log_tick(orchestrator: &BotOrchestrator, batch: &ActionBatch) {
    if let Some(report) = orchestrator.last_report() {
        debug!(
            "tick {}: {} action(s), {} spawn(s), {} failure(s), {} reaped",
            report.tick,
            batch.len(),
            report.spawned.len(),
            report.failures.len(),
            report.reaped.len()
        );
    }
}
