//! Arrow export
//!
//! Every protocol becomes one `RecordBatch` of nullable UTF-8 columns:
//!
//! ```text
//! protocol | group | purpose | role | path | client_id | model_id | claimed_client_id
//! ```
//!
//! `protocol` is null for the unnamed protocol, `model_id` for probe and
//! Z-norm records, `claimed_client_id` for everything but score records.

use std::sync::Arc;

use arrow::array::{ArrayRef, RecordBatch, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};

use super::RecordSink;
use crate::protocol::ProtocolId;
use crate::record::Record;
use crate::Result;

/// Schema of the batches produced by [`ArrowSink`].
#[must_use]
pub fn record_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("protocol", DataType::Utf8, true),
        Field::new("group", DataType::Utf8, false),
        Field::new("purpose", DataType::Utf8, false),
        Field::new("role", DataType::Utf8, false),
        Field::new("path", DataType::Utf8, false),
        Field::new("client_id", DataType::Utf8, false),
        Field::new("model_id", DataType::Utf8, true),
        Field::new("claimed_client_id", DataType::Utf8, true),
    ]))
}

#[derive(Debug, Default)]
struct Columns {
    protocol: Vec<Option<String>>,
    group: Vec<&'static str>,
    purpose: Vec<&'static str>,
    role: Vec<&'static str>,
    path: Vec<String>,
    client_id: Vec<String>,
    model_id: Vec<Option<String>>,
    claimed_client_id: Vec<Option<String>>,
}

impl Columns {
    fn push(&mut self, record: &Record) {
        self.protocol
            .push(record.protocol().name().map(str::to_owned));
        self.group.push(record.group().as_str());
        self.purpose.push(record.purpose().as_str());
        self.role.push(record.role().as_str());
        self.path.push(record.path().to_owned());
        self.client_id.push(record.client_id().to_owned());
        self.model_id.push(record.model_id().map(str::to_owned));
        self.claimed_client_id
            .push(record.claimed_client_id().map(str::to_owned));
    }

    fn into_arrays(self) -> Vec<ArrayRef> {
        vec![
            Arc::new(StringArray::from(self.protocol)),
            Arc::new(StringArray::from(self.group)),
            Arc::new(StringArray::from(self.purpose)),
            Arc::new(StringArray::from(self.role)),
            Arc::new(StringArray::from(self.path)),
            Arc::new(StringArray::from(self.client_id)),
            Arc::new(StringArray::from(self.model_id)),
            Arc::new(StringArray::from(self.claimed_client_id)),
        ]
    }
}

/// Sink building one Arrow batch per exported protocol.
#[derive(Debug, Default)]
pub struct ArrowSink {
    pending: Columns,
    batches: Vec<(ProtocolId, RecordBatch)>,
}

impl ArrowSink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Completed batches, one per protocol, in export order.
    #[must_use]
    pub fn batches(&self) -> &[(ProtocolId, RecordBatch)] {
        &self.batches
    }

    /// Take the completed batches.
    #[must_use]
    pub fn into_batches(self) -> Vec<(ProtocolId, RecordBatch)> {
        self.batches
    }
}

impl RecordSink for ArrowSink {
    fn emit(&mut self, record: &Record) -> Result<()> {
        self.pending.push(record);
        Ok(())
    }

    fn end_protocol(&mut self, protocol: &ProtocolId) -> Result<()> {
        let columns = std::mem::take(&mut self.pending);
        let batch = RecordBatch::try_new(record_schema(), columns.into_arrays())?;
        self.batches.push((protocol.clone(), batch));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListRole;
    use crate::record::{EnrollmentRecord, Group, ProbeRecord, Sample};
    use arrow::array::Array;

    #[test]
    fn test_batch_per_protocol() {
        let mut sink = ArrowSink::new();
        sink.emit(&Record::Enrollment(EnrollmentRecord::new(
            ProtocolId::unnamed(),
            Group::World,
            ListRole::World,
            Sample::new("w1", "c9"),
            "c9",
        )))
        .unwrap();
        sink.emit(&Record::Probe(ProbeRecord::new(
            ProtocolId::unnamed(),
            Group::Dev,
            Sample::new("s021", "c1"),
        )))
        .unwrap();
        sink.end_protocol(&ProtocolId::unnamed()).unwrap();
        sink.end_protocol(&ProtocolId::named("empty")).unwrap();

        let batches = sink.into_batches();
        assert_eq!(batches.len(), 2);
        let (_, batch) = &batches[0];
        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), 8);

        let protocol = batch.column(0).as_any().downcast_ref::<StringArray>().unwrap();
        assert!(protocol.is_null(0));
        let role = batch.column(3).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(role.value(0), "world");
        assert_eq!(role.value(1), "for_probes");
        let model = batch.column(6).as_any().downcast_ref::<StringArray>().unwrap();
        assert_eq!(model.value(0), "c9");
        assert!(model.is_null(1));

        assert_eq!(batches[1].1.num_rows(), 0);
    }
}
