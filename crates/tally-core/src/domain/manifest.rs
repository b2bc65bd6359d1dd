//! Manifest rows and ledger construction.
//!
//! Rows sharing a product code collapse into one line whose target is the
//! sum of their quantities. Sub-rows (those naming a `parent_code`) collapse
//! the same way, scoped to their parent.

use serde::{Deserialize, Serialize};

use super::errors::TallyError;
use super::line::LineItem;
use crate::ports::IdGenerator;

/// One row as delivered by the manifest importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRow {
    pub product_code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub barcode: String,
    pub quantity: u32,
    /// Outbound orders: product code of the line this row is nested under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_code: Option<String>,
}

impl ManifestRow {
    pub fn new(
        product_code: impl Into<String>,
        name: impl Into<String>,
        barcode: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product_code: product_code.into(),
            name: name.into(),
            barcode: barcode.into(),
            quantity,
            parent_code: None,
        }
    }

    pub fn under(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }

    /// Rows with no product code cannot be reconciled and are dropped.
    fn is_usable(&self) -> bool {
        !self.product_code.trim().is_empty()
    }

    /// Importers leave the barcode blank when none was printed; the product
    /// code is what gets scanned in that case.
    fn effective_barcode(&self) -> &str {
        let barcode = self.barcode.trim();
        if barcode.is_empty() {
            self.product_code.trim()
        } else {
            &self.barcode
        }
    }
}

/// Build the initial ledger for a task. Every line starts at zero scanned.
pub fn build_ledger(
    rows: &[ManifestRow],
    ids: &dyn IdGenerator,
) -> Result<Vec<LineItem>, TallyError> {
    let mut lines: Vec<LineItem> = Vec::new();

    for row in rows.iter().filter(|r| r.is_usable() && r.parent_code.is_none()) {
        let code = row.product_code.trim();
        match lines.iter_mut().find(|l| l.product_code == code) {
            Some(existing) => {
                if !existing.absorb(row.quantity) {
                    return Err(TallyError::QuantityOverflow(code.to_string()));
                }
            }
            None => {
                let seq = lines.len() as u32 + 1;
                lines.push(LineItem::new(
                    ids.generate_line_id(),
                    seq,
                    code,
                    row.name.trim(),
                    row.effective_barcode(),
                    row.quantity,
                ));
            }
        }
    }

    for row in rows.iter().filter(|r| r.is_usable()) {
        let Some(parent_code) = row.parent_code.as_deref().map(str::trim) else {
            continue;
        };
        let code = row.product_code.trim();
        let parent = lines
            .iter_mut()
            .find(|l| l.product_code == parent_code)
            .ok_or_else(|| TallyError::OrphanSubLine {
                product_code: code.to_string(),
                parent_code: parent_code.to_string(),
            })?;
        match parent.sub_lines.iter_mut().find(|l| l.product_code == code) {
            Some(existing) => {
                if !existing.absorb(row.quantity) {
                    return Err(TallyError::QuantityOverflow(code.to_string()));
                }
            }
            None => {
                let seq = parent.sub_lines.len() as u32 + 1;
                parent.sub_lines.push(LineItem::new(
                    ids.generate_line_id(),
                    seq,
                    code,
                    row.name.trim(),
                    row.effective_barcode(),
                    row.quantity,
                ));
            }
        }
    }

    // A ledger with nothing to count would read as complete before the first scan.
    let total_target: u64 = lines
        .iter()
        .flat_map(|l| l.iter_flat())
        .map(|l| u64::from(l.target_qty()))
        .sum();
    if total_target == 0 {
        return Err(TallyError::ManifestEmpty);
    }
    Ok(lines)
}
