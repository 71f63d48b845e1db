use crate::{models::Item, Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Markdown,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Markdown => "md",
        }
    }
}

/// Snapshot export/import for the item collection
///
/// JSON is the canonical interchange format: a plain ordered array of item
/// records, round-trip safe. CSV and Markdown are one-way, for spreadsheets
/// and notes.
pub struct Exporter;

impl Exporter {
    /// Export items to a file with automatic format detection
    pub fn export_to_file<P: AsRef<Path>>(items: &[Item], path: P) -> Result<()> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ConfigError(
                    "Could not determine export format from extension. Use .json, .csv, or .md"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(items, path, format)
    }

    /// Export items to a file with explicit format
    pub fn export_to_file_with_format<P: AsRef<Path>>(
        items: &[Item],
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let content = match format {
            ExportFormat::Json => Self::to_json(items)?,
            ExportFormat::Csv => Self::to_csv(items),
            ExportFormat::Markdown => Self::to_markdown(items),
        };

        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }

    pub fn to_json(items: &[Item]) -> Result<String> {
        Ok(serde_json::to_string_pretty(items)?)
    }

    pub fn to_csv(items: &[Item]) -> String {
        let mut output = String::new();

        output.push_str(
            "Id,Name,Qty,Category,Purchase Date,Expiry Date,Perishable,\
             Notified 24h,Notified 72h,Notified Expired\n",
        );

        for item in items {
            output.push_str(&format!(
                "{},{},{},{},{},{},{},{},{},{}\n",
                Self::escape_csv(&item.id),
                Self::escape_csv(&item.name),
                item.qty,
                Self::escape_csv(&item.category),
                Self::escape_csv(&item.purchase),
                Self::escape_csv(&item.expiry),
                item.is_perishable(),
                item.flags.near_expiry_24h,
                item.flags.reminder_72h,
                item.flags.expired,
            ));
        }

        output
    }

    pub fn to_markdown(items: &[Item]) -> String {
        let mut output = String::new();

        output.push_str("# Tracked Items\n\n");
        output.push_str(&format!("Total items: {}\n\n", items.len()));
        output.push_str("| Name | Qty | Category | Expiry | Notified |\n");
        output.push_str("|------|-----|----------|--------|----------|\n");

        for item in items {
            let mut fired = Vec::new();
            if item.flags.near_expiry_24h {
                fired.push("24h");
            }
            if item.flags.reminder_72h {
                fired.push("72h");
            }
            if item.flags.expired {
                fired.push("expired");
            }

            output.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                item.name,
                item.qty,
                item.category,
                item.expiry,
                if fired.is_empty() {
                    "-".to_string()
                } else {
                    fired.join(", ")
                },
            ));
        }

        output
    }

    /// Import a collection from a JSON export. Records missing an id get a
    /// fresh one, so hand-written files work too.
    pub fn from_json(json: &str) -> Result<Vec<Item>> {
        let mut items: Vec<Item> = serde_json::from_str(json)?;
        for item in &mut items {
            if item.id.is_empty() {
                item.id = uuid::Uuid::new_v4().to_string();
            }
        }
        Ok(items)
    }

    pub fn import_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<Item>> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn escape_csv(field: &str) -> String {
        if field.contains(',') || field.contains('"') || field.contains('\n') {
            format!("\"{}\"", field.replace('"', "\"\""))
        } else {
            field.to_string()
        }
    }
}
