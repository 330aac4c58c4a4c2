use anyhow::Result;
use serde_json::json;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use crate::extract::DependencyRecord;

/// Writes the record sequence as JSON for consumers other than Graphviz
pub struct JsonRecordWriter {
    /// Indented output instead of a single line
    pretty: bool,
}

impl JsonRecordWriter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn format_to_file(&self, records: &[DependencyRecord], output_path: &Path) -> Result<()> {
        let json_content = self.format_records(records)?;
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(output_path, json_content)?;
        Ok(())
    }

    pub fn format_records(&self, records: &[DependencyRecord]) -> Result<String> {
        let files: BTreeSet<_> = records.iter().map(|r| r.file.as_path()).collect();

        let output = json!({
            "meta": {
                "records": records.len(),
                "files": files.len(),
            },
            "records": records,
        });

        if self.pretty {
            Ok(serde_json::to_string_pretty(&output)?)
        } else {
            Ok(serde_json::to_string(&output)?)
        }
    }
}

impl Default for JsonRecordWriter {
    fn default() -> Self {
        Self::new()
    }
}
