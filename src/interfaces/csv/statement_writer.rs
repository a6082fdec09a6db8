use crate::domain::ledger::LedgerEntry;
use crate::error::Result;
use std::io::Write;

/// Writes a player's ledger entries as CSV.
///
/// Columns follow the ledger's field names, `payment amount` then
/// `payment source`, one row per entry in append order.
pub struct StatementWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> StatementWriter<W> {
    /// Creates a new `StatementWriter` over any `Write` sink (e.g., Stdout, File).
    pub fn new(sink: W) -> Self {
        let writer = csv::WriterBuilder::new().has_headers(true).from_writer(sink);
        Self { writer }
    }

    pub fn write_entries<'a>(&mut self, entries: impl IntoIterator<Item = &'a LedgerEntry>) -> Result<()> {
        let mut written = 0usize;
        for entry in entries {
            self.writer.serialize(entry)?;
            written += 1;
        }
        if written == 0 {
            self.writer
                .write_record(["payment amount", "payment source"])?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
