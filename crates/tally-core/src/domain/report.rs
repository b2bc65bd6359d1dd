//! Tabular report of a task, for download.

use serde::{Deserialize, Serialize};

use super::line::{LineItem, LineStatus};
use super::task::Task;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub product_code: String,
    pub name: String,
    pub barcode: String,
    pub target_qty: u32,
    pub scanned_qty: u32,
    pub status: LineStatus,
}

impl From<&LineItem> for ReportRow {
    fn from(line: &LineItem) -> Self {
        Self {
            product_code: line.product_code.clone(),
            name: line.name.clone(),
            barcode: line.barcode.clone(),
            target_qty: line.target_qty(),
            scanned_qty: line.scanned_qty(),
            status: line.status(),
        }
    }
}

/// One row per line; sub-lines follow their parent.
pub fn report_rows(task: &Task) -> Vec<ReportRow> {
    task.iter_lines().map(ReportRow::from).collect()
}

/// Render rows as CSV with a header line.
pub fn render_csv(rows: &[ReportRow]) -> Result<String, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "product_code",
        "name",
        "barcode",
        "target_qty",
        "scanned_qty",
        "status",
    ])?;
    for row in rows {
        writer.write_record([
            row.product_code.as_str(),
            row.name.as_str(),
            row.barcode.as_str(),
            &row.target_qty.to_string(),
            &row.scanned_qty.to_string(),
            row.status.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, target: u32, scanned: u32) -> ReportRow {
        ReportRow {
            product_code: code.to_string(),
            name: name.to_string(),
            barcode: "1001".to_string(),
            target_qty: target,
            scanned_qty: scanned,
            status: LineStatus::derive(scanned, target),
        }
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = render_csv(&[row("A1", "Tea", 2, 1)]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next(),
            Some("product_code,name,barcode,target_qty,scanned_qty,status")
        );
        assert_eq!(lines.next(), Some("A1,Tea,1001,2,1,partial"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn names_with_commas_are_quoted() {
        let csv = render_csv(&[row("A1", "Tea, green", 1, 1)]).unwrap();
        assert!(csv.contains("\"Tea, green\""));
    }
}
