use serde_json::Value;

use crate::error::SourceError;
use crate::types::Record;

/// Column plan for one source type: a fixed, hand-specified output order
/// plus the field renames applied before columns are selected.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    columns: &'static [&'static str],
    renames: &'static [(&'static str, &'static str)],
}

impl Projection {
    pub const fn new(
        columns: &'static [&'static str],
        renames: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { columns, renames }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        self.columns
    }

    /// Serialises the records to CSV text.
    ///
    /// The header row is always emitted, even for an empty input. Fields
    /// absent on a record render as empty cells; fields not named in the
    /// column list are dropped. Every projected value has its newlines
    /// replaced with single spaces so each record stays on one CSV line.
    pub fn to_csv(&self, records: &[Record]) -> Result<String, SourceError> {
        let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());
        writer.write_record(self.columns)?;

        for record in records {
            let renamed = self.rename(record);
            let row: Vec<String> = self
                .columns
                .iter()
                .map(|column| renamed.get(*column).map(render_value).unwrap_or_default())
                .collect();
            writer.write_record(&row)?;
        }

        let bytes = writer.into_inner().map_err(|err| SourceError::Internal {
            message: err.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|err| SourceError::Internal {
            message: err.to_string(),
        })
    }

    fn rename(&self, record: &Record) -> Record {
        let mut renamed = Record::new();
        for (key, value) in record {
            let name = self
                .renames
                .iter()
                .find(|(from, _)| *from == key.as_str())
                .map(|(_, to)| *to)
                .unwrap_or(key.as_str());
            renamed.insert(name.to_string(), value.clone());
        }
        renamed
    }
}

/// Renders one JSON value as CSV cell text. Arrays become their items
/// joined by single spaces; null renders empty.
fn render_value(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_value)
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(_) => value.to_string(),
    };
    sanitize_newlines(&text)
}

fn sanitize_newlines(text: &str) -> String {
    if text.contains('\n') || text.contains('\r') {
        text.replace("\r\n", " ").replace(['\n', '\r'], " ")
    } else {
        text.to_string()
    }
}
