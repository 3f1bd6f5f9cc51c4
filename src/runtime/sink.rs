//! Result sink: serialize drained output entries.
//!
//! Two formats:
//! - `Text`: `id: value` per line, lists as `[v1, v2]`
//! - `JsonLines`: one JSON object per entry, tagged with kind and context

use std::io::{self, Write};

use serde::Serialize;

use crate::core::{format_float, OutputEntry, OutputValue};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SinkFormat {
    #[default]
    Text,
    JsonLines,
}

#[derive(Serialize)]
#[serde(untagged)]
enum JsonValue<'a> {
    Int(i32),
    Float(f32),
    List(&'a [f32]),
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    id: u32,
    kind: String,
    value: JsonValue<'a>,
    context: String,
}

/// Text rendering of a payload.
pub fn format_value(value: &OutputValue) -> String {
    match value {
        OutputValue::Int(v) => v.to_string(),
        OutputValue::Float(v) => format_float(*v),
        OutputValue::List(items) => {
            let parts: Vec<String> = items.iter().map(|v| format_float(*v)).collect();
            format!("[{}]", parts.join(", "))
        }
    }
}

/// `id: value`
pub fn format_line(entry: &OutputEntry) -> String {
    format!("{}: {}", entry.id, format_value(&entry.value))
}

/// One JSON object. Non-finite floats serialize as `null`.
pub fn to_json(entry: &OutputEntry) -> serde_json::Result<String> {
    let value = match &entry.value {
        OutputValue::Int(v) => JsonValue::Int(*v),
        OutputValue::Float(v) => JsonValue::Float(*v),
        OutputValue::List(items) => JsonValue::List(items),
    };
    serde_json::to_string(&JsonRecord {
        id: entry.id,
        kind: entry.value.kind().to_string(),
        value,
        context: entry.context.to_string(),
    })
}

/// Serializes entries in drain order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultSink {
    format: SinkFormat,
}

impl ResultSink {
    pub fn new(format: SinkFormat) -> Self {
        Self { format }
    }

    pub fn text() -> Self {
        Self::new(SinkFormat::Text)
    }

    pub fn json_lines() -> Self {
        Self::new(SinkFormat::JsonLines)
    }

    pub fn format(&self) -> SinkFormat {
        self.format
    }

    fn line(&self, entry: &OutputEntry) -> io::Result<String> {
        match self.format {
            SinkFormat::Text => Ok(format_line(entry)),
            SinkFormat::JsonLines => to_json(entry).map_err(io::Error::from),
        }
    }

    /// Write every entry, one per line.
    pub fn write_to<W: Write>(&self, entries: &[OutputEntry], writer: &mut W) -> io::Result<()> {
        for entry in entries {
            writeln!(writer, "{}", self.line(entry)?)?;
        }
        writer.flush()
    }

    /// Render every entry into one string.
    pub fn render(&self, entries: &[OutputEntry]) -> io::Result<String> {
        let mut buffer = Vec::new();
        self.write_to(entries, &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}
