use crate::domain::payment::Payment;
use crate::error::Result;
use std::io::Write;

/// Writes the final state of all payments, history included, as JSON.
pub struct SnapshotWriter<W: Write> {
    writer: W,
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_payments(&mut self, payments: &[Payment]) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, payments).map_err(std::io::Error::from)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
