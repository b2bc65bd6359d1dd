//! Line items: expected vs. scanned quantity for one product.

use serde::{Deserialize, Serialize};

use super::barcode;
use super::ids::LineId;

/// Progress of a single line.
///
/// Never stored: always derived from `(scanned_qty, target_qty)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStatus {
    NotStarted,
    Partial,
    Completed,
}

impl LineStatus {
    pub fn derive(scanned_qty: u32, target_qty: u32) -> Self {
        if scanned_qty >= target_qty {
            LineStatus::Completed
        } else if scanned_qty == 0 {
            LineStatus::NotStarted
        } else {
            LineStatus::Partial
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineStatus::NotStarted => "not_started",
            LineStatus::Partial => "partial",
            LineStatus::Completed => "completed",
        }
    }
}

/// One product's record within a task.
///
/// Quantities are private so every mutation goes through the methods below,
/// which keep `scanned_qty <= target_qty`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub id: LineId,
    /// 1-based manifest position (sub-lines number within their parent).
    pub seq: u32,
    pub product_code: String,
    pub name: String,
    /// Barcode as printed on the manifest, suffix included.
    pub barcode: String,
    pub is_aggregated: bool,
    target_qty: u32,
    scanned_qty: u32,
    /// Outbound nested lines. Their quantities are never folded into ours.
    pub sub_lines: Vec<LineItem>,
}

impl LineItem {
    pub fn new(
        id: LineId,
        seq: u32,
        product_code: impl Into<String>,
        name: impl Into<String>,
        barcode: impl Into<String>,
        target_qty: u32,
    ) -> Self {
        Self {
            id,
            seq,
            product_code: product_code.into(),
            name: name.into(),
            barcode: barcode.into(),
            is_aggregated: false,
            target_qty,
            scanned_qty: 0,
            sub_lines: Vec::new(),
        }
    }

    pub fn target_qty(&self) -> u32 {
        self.target_qty
    }

    pub fn scanned_qty(&self) -> u32 {
        self.scanned_qty
    }

    pub fn status(&self) -> LineStatus {
        LineStatus::derive(self.scanned_qty, self.target_qty)
    }

    pub fn is_completed(&self) -> bool {
        self.status() == LineStatus::Completed
    }

    /// Units still to be scanned.
    pub fn remaining(&self) -> u32 {
        self.target_qty.saturating_sub(self.scanned_qty)
    }

    /// Letter-suffixed barcodes denote special packaging and are easy to
    /// misscan; operators get them highlighted.
    pub fn needs_attention(&self) -> bool {
        barcode::has_variant_suffix(&self.barcode)
    }

    /// Merge another manifest row for the same product. Returns false (and
    /// changes nothing) if the summed target would not fit.
    pub(crate) fn absorb(&mut self, qty: u32) -> bool {
        let Some(target) = self.target_qty.checked_add(qty) else {
            return false;
        };
        self.target_qty = target;
        self.is_aggregated = true;
        true
    }

    /// Add one unit. Returns false (and changes nothing) at target.
    pub(crate) fn try_increment(&mut self) -> bool {
        if self.scanned_qty >= self.target_qty {
            return false;
        }
        self.scanned_qty += 1;
        true
    }

    /// Overwrite the count, clamped into `0..=target_qty`.
    pub(crate) fn set_scanned(&mut self, qty: i64) {
        self.scanned_qty = qty.clamp(0, i64::from(self.target_qty)) as u32;
    }

    /// This line and its sub-lines, parent first.
    pub fn iter_flat(&self) -> impl Iterator<Item = &LineItem> {
        std::iter::once(self).chain(self.sub_lines.iter())
    }

    pub fn snapshot(&self) -> LineSnapshot {
        LineSnapshot {
            id: self.id,
            seq: self.seq,
            product_code: self.product_code.clone(),
            name: self.name.clone(),
            barcode: self.barcode.clone(),
            target_qty: self.target_qty,
            scanned_qty: self.scanned_qty,
            status: self.status(),
            is_aggregated: self.is_aggregated,
            needs_attention: self.needs_attention(),
            sub_lines: self.sub_lines.iter().map(LineItem::snapshot).collect(),
        }
    }
}

/// Serializable copy of a line handed to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSnapshot {
    pub id: LineId,
    pub seq: u32,
    pub product_code: String,
    pub name: String,
    pub barcode: String,
    pub target_qty: u32,
    pub scanned_qty: u32,
    pub status: LineStatus,
    pub is_aggregated: bool,
    pub needs_attention: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_lines: Vec<LineSnapshot>,
}
