//! Report formatter implementation
//! Author: kartik4091

use std::fmt::Write;

use super::{MetadataReport, ReportError, ReportFormat};

/// Formats a metadata report for the terminal or for machines
pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(report: &MetadataReport, format: ReportFormat) -> Result<String, ReportError> {
        match format {
            ReportFormat::PlainText => Ok(Self::to_text(report)),
            ReportFormat::Json => Self::to_json(report),
        }
    }

    fn to_text(report: &MetadataReport) -> String {
        let mut output = String::new();
        let _ = writeln!(output, "{}", report.file);
        let _ = writeln!(output, "  PDF version: {}", report.pdf_version);
        let _ = writeln!(output, "  Pages:       {}", report.page_count);

        output.push_str("  Info dictionary:\n");
        if report.info.is_empty() {
            output.push_str("    (none)\n");
        }
        for (key, value) in &report.info {
            let _ = writeln!(output, "    {:<13} {}", key, value);
        }

        output.push_str("  XMP packet:\n");
        match &report.xmp {
            Some(xmp) => {
                let _ = writeln!(output, "    dc:creator      [{}]", xmp.creator.join(", "));
                let _ = writeln!(output, "    xmp:CreatorTool {}", xmp.creator_tool.as_deref().unwrap_or("-"));
                let _ = writeln!(output, "    pdf:Producer    {}", xmp.producer.as_deref().unwrap_or("-"));
            }
            None => output.push_str("    (none)\n"),
        }
        output
    }

    fn to_json(report: &MetadataReport) -> Result<String, ReportError> {
        serde_json::to_string_pretty(report)
            .map_err(|e| ReportError::SerializationError(e.to_string()))
    }
}
