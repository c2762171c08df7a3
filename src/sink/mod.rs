//! Record sinks
//!
//! A sink receives the records of one protocol in query order through
//! [`crate::Database::export`], followed by one `end_protocol` call.
//! [`VecSink`] collects records in memory; [`ArrowSink`] turns each protocol
//! into one Arrow `RecordBatch`.

mod arrow;

pub use self::arrow::{record_schema, ArrowSink};

use crate::protocol::ProtocolId;
use crate::record::Record;
use crate::Result;

/// Consumer of exported records.
pub trait RecordSink {
    /// Receive one record.
    ///
    /// # Errors
    ///
    /// Implementation specific; the export stops at the first error.
    fn emit(&mut self, record: &Record) -> Result<()>;

    /// Called once after the last record of a protocol.
    ///
    /// # Errors
    ///
    /// Implementation specific.
    fn end_protocol(&mut self, _protocol: &ProtocolId) -> Result<()> {
        Ok(())
    }
}

/// Sink collecting records into a vector.
#[derive(Debug, Default, Clone)]
pub struct VecSink {
    records: Vec<Record>,
    protocols: Vec<ProtocolId>,
}

impl VecSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records received so far.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Protocols completed so far.
    #[must_use]
    pub fn protocols(&self) -> &[ProtocolId] {
        &self.protocols
    }

    /// Take the collected records.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl RecordSink for VecSink {
    fn emit(&mut self, record: &Record) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn end_protocol(&mut self, protocol: &ProtocolId) -> Result<()> {
        self.protocols.push(protocol.clone());
        Ok(())
    }
}
