use std::fmt;

use crate::error::Result;
use crate::types::ImportRecord;

/// Output syntax for the resolved records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// `import { to = ADDR  id = "ID" }` (Terraform 1.5+)
    #[default]
    Blocks,
    /// `import { to = "ADDR"  id = "ID" }`
    QuotedBlocks,
    /// `import { address = "ADDR"  id = "ID" }`
    LegacyBlocks,
    /// `terraform import ADDR ID`
    Commands,
    /// JSON array of `{"address": ..., "import_id": ...}` objects
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Blocks => write!(f, "blocks"),
            OutputFormat::QuotedBlocks => write!(f, "quoted-blocks"),
            OutputFormat::LegacyBlocks => write!(f, "legacy-blocks"),
            OutputFormat::Commands => write!(f, "commands"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl OutputFormat {
    pub fn renderer(self) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Blocks => Box::new(ImportBlocks { quote_target: false }),
            OutputFormat::QuotedBlocks => Box::new(ImportBlocks { quote_target: true }),
            OutputFormat::LegacyBlocks => Box::new(LegacyImportBlocks),
            OutputFormat::Commands => Box::new(ImportCommands),
            OutputFormat::Json => Box::new(JsonRecords),
        }
    }
}

/// Turns import records into text, one entry per record, in record order
pub trait Renderer {
    fn render_record(&self, record: &ImportRecord) -> Result<String>;

    /// Separator placed between two rendered records
    fn separator(&self) -> &'static str {
        "\n"
    }

    fn render(&self, records: &[ImportRecord]) -> Result<String> {
        Ok(records
            .iter()
            .map(|r| self.render_record(r))
            .collect::<Result<Vec<_>>>()?
            .join(self.separator()))
    }
}

pub struct ImportBlocks {
    pub quote_target: bool,
}

impl Renderer for ImportBlocks {
    fn render_record(&self, record: &ImportRecord) -> Result<String> {
        let target = if self.quote_target {
            hcl_string(&record.address)
        } else {
            record.address.clone()
        };
        Ok(format!(
            "import {{\n  to = {}\n  id = {}\n}}\n",
            target,
            hcl_string(&record.import_id)
        ))
    }
}

pub struct LegacyImportBlocks;

impl Renderer for LegacyImportBlocks {
    fn render_record(&self, record: &ImportRecord) -> Result<String> {
        Ok(format!(
            "import {{\n  address = {}\n  id      = {}\n}}\n",
            hcl_string(&record.address),
            hcl_string(&record.import_id)
        ))
    }
}

pub struct ImportCommands;

impl Renderer for ImportCommands {
    fn render_record(&self, record: &ImportRecord) -> Result<String> {
        Ok(format!(
            "terraform import {} {}\n",
            shell_quote(&record.address),
            shell_quote(&record.import_id)
        ))
    }

    fn separator(&self) -> &'static str {
        ""
    }
}

pub struct JsonRecords;

impl Renderer for JsonRecords {
    fn render_record(&self, record: &ImportRecord) -> Result<String> {
        Ok(serde_json::to_string(record)?)
    }

    fn render(&self, records: &[ImportRecord]) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(records)?))
    }
}

/// Renders `value` as an HCL string literal
fn hcl_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Single-quotes `value` for a POSIX shell when it contains anything beyond
/// characters that are safe unquoted
fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}
