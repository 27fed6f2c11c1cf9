use crate::simulation::TickSummary;
use anyhow::{Context, Result};
use bacterio_common::{FieldConfig, SimParams};
use chrono::Local;
use csv::{Writer, WriterBuilder};
use log::info;
use serde_json::Value;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Population totals after a tick. Step 0 is the initial state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    pub step: u64,
    pub bacteria: usize,
    pub predators: usize,
}

impl From<&TickSummary> for TraceRecord {
    fn from(summary: &TickSummary) -> Self {
        TraceRecord {
            step: summary.tick,
            bacteria: summary.bacteria,
            predators: summary.predators,
        }
    }
}

/// Receives one record per tick.
pub trait TraceSink {
    fn record(&mut self, record: &TraceRecord) -> Result<()>;

    /// Flushes anything buffered. Called once when the run ends.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

impl TraceSink for Vec<TraceRecord> {
    fn record(&mut self, record: &TraceRecord) -> Result<()> {
        self.push(*record);
        Ok(())
    }
}

/// Writes the trace as CSV with a `step,bacteria,predators` header.
///
/// Two `#`-prefixed rows above the header record the field and model
/// settings of the run, as `key=value` cells. Readers built with
/// `csv::ReaderBuilder::comment(Some(b'#'))` skip them.
pub struct CsvTraceWriter {
    writer: Writer<File>,
    path: PathBuf,
}

impl CsvTraceWriter {
    /// Opens `<prefix>_<YYYYmmdd-HH-MM-SS>.csv`, stamped with the local time.
    pub fn create(prefix: &str, field: &FieldConfig, params: &SimParams) -> Result<Self> {
        let stamp = Local::now().format("%Y%m%d-%H-%M-%S");
        Self::at_path(format!("{}_{}.csv", prefix, stamp), field, params)
    }

    pub fn at_path<P: AsRef<Path>>(path: P, field: &FieldConfig, params: &SimParams) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        // Settings rows are longer than the table rows.
        let mut writer = WriterBuilder::new()
            .flexible(true)
            .from_path(&path)
            .with_context(|| format!("Error creating trace file '{}'", path.display()))?;
        writer.write_record(settings_row("field", serde_json::to_value(field)?))?;
        writer.write_record(settings_row("model", serde_json::to_value(params)?))?;
        writer.write_record(["step", "bacteria", "predators"])?;
        info!("Writing trace to {}", path.display());
        Ok(Self { writer, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `# <name>` followed by one `key=value` cell per set entry, sorted by key.
fn settings_row(name: &str, section: Value) -> Vec<String> {
    let mut row = vec![format!("# {}", name)];
    if let Value::Object(entries) = section {
        let mut entries: Vec<(String, Value)> = entries.into_iter().collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for (key, value) in entries {
            match value {
                Value::Null => {}
                Value::String(text) => row.push(format!("{}={}", key, text)),
                other => row.push(format!("{}={}", key, other)),
            }
        }
    }
    row
}

impl TraceSink for CsvTraceWriter {
    fn record(&mut self, record: &TraceRecord) -> Result<()> {
        self.writer.write_record(&[
            record.step.to_string(),
            record.bacteria.to_string(),
            record.predators.to_string(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer
            .flush()
            .with_context(|| format!("Error flushing trace file '{}'", self.path.display()))
    }
}
