use super::command_parser::parse_line;
use crate::application::command::CommandKind;
use crate::application::processor::CommandProcessor;
use crate::error::Result;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Counters for one pass over the input.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub commands: usize,
    pub errors: usize,
}

/// The read-parse-execute-report loop.
///
/// Each non-blank line is parsed and executed before the next one is read.
/// Lines are raw bytes; invalid UTF-8 is replaced with U+FFFD rather than
/// ending the run. Failures are written as a single `ERROR <message>` line and the loop moves
/// on; only EXIT or end of input stop it.
pub struct Runner<'a, W: Write> {
    processor: &'a CommandProcessor,
    output: W,
}

impl<'a, W: Write> Runner<'a, W> {
    pub fn new(processor: &'a CommandProcessor, output: W) -> Self {
        Self { processor, output }
    }

    pub async fn run<R: AsyncBufRead + Unpin>(&mut self, mut input: R) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }
            let text = String::from_utf8_lossy(&buf);
            let line = text.trim();
            if line.is_empty() {
                continue;
            }

            let command = match parse_line(line) {
                Ok(command) => command,
                Err(e) => {
                    summary.errors += 1;
                    tracing::debug!(line, error = %e, "Rejected input line");
                    writeln!(self.output, "ERROR {e}")?;
                    continue;
                }
            };

            if command.name == CommandKind::Exit.name() {
                tracing::debug!("EXIT received");
                break;
            }

            summary.commands += 1;
            match self.processor.execute(&command).await {
                Ok(result) if result.is_empty() => {}
                Ok(result) => writeln!(self.output, "{result}")?,
                Err(e) => {
                    summary.errors += 1;
                    writeln!(self.output, "ERROR {e}")?;
                }
            }
            self.output.flush()?;
        }

        Ok(summary)
    }
}
