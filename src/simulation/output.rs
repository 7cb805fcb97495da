//! CDR output sinks
//!
//! Records are written one per line, either as JSON lines or as CSV with a
//! header row. Sinks write to any [`Write`]; [`open_sink`] picks stdout or a
//! buffered file.

use crate::cdr::Cdr;
use crate::simulation::error::SimulationResult;
use crate::types::OutputFormat;
use chrono::SecondsFormat;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Column order of the CSV output
pub const CSV_HEADER: [&str; 24] = [
    "id",
    "timestamp_start",
    "duration_seconds",
    "customer_id",
    "msisdn",
    "technology",
    "network_element_id",
    "service_type_id",
    "jitter",
    "latency",
    "throughput",
    "packet_loss",
    "call_setup_time",
    "mos",
    "location_cell",
    "timestamp_end",
    "called_msisdn",
    "roaming",
    "service_category",
    "message_length",
    "delivery_status",
    "call_id",
    "segment",
    "segment_count",
];

/// Destination for generated records
pub trait CdrSink {
    /// Write one record
    fn write_cdr(&mut self, cdr: &Cdr) -> SimulationResult<()>;

    /// Flush buffered output
    fn finish(&mut self) -> SimulationResult<()>;

    /// Records written so far
    fn written(&self) -> u64;
}

/// Writes one JSON object per line
#[derive(Debug)]
pub struct JsonLinesSink<W: Write> {
    writer: W,
    written: u64,
}

impl<W: Write> JsonLinesSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> CdrSink for JsonLinesSink<W> {
    fn write_cdr(&mut self, cdr: &Cdr) -> SimulationResult<()> {
        serde_json::to_writer(&mut self.writer, cdr)?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> SimulationResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn written(&self) -> u64 {
        self.written
    }
}

/// Writes a header row followed by one CSV row per record
#[derive(Debug)]
pub struct CsvSink<W: Write> {
    writer: W,
    written: u64,
    header_written: bool,
}

impl<W: Write> CsvSink<W> {
    /// Wrap a writer
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0, header_written: false }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{}", CSV_HEADER.join(","))?;
        self.header_written = true;
        Ok(())
    }
}

impl<W: Write> CdrSink for CsvSink<W> {
    fn write_cdr(&mut self, cdr: &Cdr) -> SimulationResult<()> {
        if !self.header_written {
            self.write_header()?;
        }

        let fields = [
            cdr.id.to_string(),
            cdr.timestamp_start.to_rfc3339_opts(SecondsFormat::Secs, true),
            cdr.duration_seconds.to_string(),
            cdr.customer_id.to_string(),
            cdr.msisdn.clone(),
            cdr.technology.to_string(),
            cdr.network_element_id.to_string(),
            cdr.service_type_id.to_string(),
            cdr.jitter.to_string(),
            cdr.latency.to_string(),
            cdr.throughput.to_string(),
            cdr.packet_loss.to_string(),
            cdr.call_setup_time.to_string(),
            cdr.mos.to_string(),
            cdr.location_cell.clone(),
            cdr.timestamp_end().to_rfc3339_opts(SecondsFormat::Secs, true),
            cdr.called_msisdn.clone().unwrap_or_default(),
            cdr.roaming.to_string(),
            cdr.service_category.to_string(),
            optional(cdr.message_length),
            optional(cdr.delivery_status),
            optional(cdr.partial.map(|p| p.call_id)),
            optional(cdr.partial.map(|p| p.segment)),
            optional(cdr.partial.map(|p| p.segments)),
        ];
        let row: Vec<String> = fields.iter().map(|field| escape_csv(field)).collect();
        writeln!(self.writer, "{}", row.join(","))?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> SimulationResult<()> {
        if !self.header_written {
            self.write_header()?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn written(&self) -> u64 {
        self.written
    }
}

fn escape_csv(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Open a sink for `format`, writing to `path` or stdout
pub fn open_sink(format: OutputFormat, path: Option<&Path>) -> SimulationResult<Box<dyn CdrSink>> {
    let writer: Box<dyn Write> = match path {
        Some(path) => {
            info!("Writing {} records to {}", format, path.display());
            Box::new(BufWriter::new(File::create(path)?))
        }
        None => Box::new(BufWriter::new(io::stdout())),
    };

    Ok(match format {
        OutputFormat::Json => Box::new(JsonLinesSink::new(writer)),
        OutputFormat::Csv => Box::new(CsvSink::new(writer)),
    })
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdr::PartialRecord;
    use crate::types::{CdrId, CustomerId, DeliveryStatus, ElementId, ServiceCategory, ServiceTypeId, TechnologyId};
    use chrono::{TimeZone, Utc};

    fn cdr(cell: &str) -> Cdr {
        Cdr {
            id: CdrId::new(),
            timestamp_start: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            duration_seconds: 90,
            customer_id: CustomerId(3),
            msisdn: "21640123456".to_string(),
            technology: TechnologyId::FourG,
            network_element_id: ElementId(12),
            service_type_id: ServiceTypeId(5),
            jitter: 2.5,
            latency: 40.0,
            throughput: 75.25,
            packet_loss: 0.1,
            call_setup_time: 900.0,
            mos: 4.2,
            location_cell: cell.to_string(),
            called_msisdn: Some("21698765432".to_string()),
            roaming: false,
            service_category: ServiceCategory::Data,
            message_length: None,
            delivery_status: None,
            partial: None,
        }
    }

    #[test]
    fn test_json_lines_output() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.write_cdr(&cdr("A")).unwrap();
        sink.write_cdr(&cdr("B")).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.written(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: Cdr = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed.location_cell, "B");
        assert!(lines[0].contains("\"technology\":\"4G\""));
    }

    #[test]
    fn test_csv_output() {
        let mut sink = CsvSink::new(Vec::new());
        sink.write_cdr(&cdr("Tunis, Centre")).unwrap();
        sink.finish().unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,timestamp_start,duration_seconds"));
        assert!(lines[1].contains(",CUST_3,21640123456,4G,NE_12,SVC_5,"));
        assert!(lines[1].contains("2024-05-01T12:00:00Z,90,"));
        assert!(lines[1].contains("\"Tunis, Centre\""));
        assert!(lines[1].contains(",2024-05-01T12:01:30Z,21698765432,false,data,,,,,"));
        assert_eq!(lines[1].split(',').count(), CSV_HEADER.len() + 1);
    }

    #[test]
    fn test_csv_sms_and_partial_columns() {
        let mut sms = cdr("A");
        sms.service_category = ServiceCategory::Sms;
        sms.message_length = Some(160);
        sms.delivery_status = Some(DeliveryStatus::Delivered);
        let mut piece = cdr("B");
        piece.partial = Some(PartialRecord { call_id: piece.id, segment: 2, segments: 3 });

        let mut sink = CsvSink::new(Vec::new());
        sink.write_cdr(&sms).unwrap();
        sink.write_cdr(&piece).unwrap();
        sink.finish().unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].ends_with(",sms,160,Delivered,,,"));
        assert!(lines[2].ends_with(&format!(",data,,,{},2,3", piece.id)));
    }

    #[test]
    fn test_empty_csv_still_has_header() {
        let mut sink = CsvSink::new(Vec::new());
        sink.finish().unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
