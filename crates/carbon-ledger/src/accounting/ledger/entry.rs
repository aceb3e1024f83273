use super::super::domain::{ensure_finite, ensure_non_negative, ValidationError};
use chrono::NaiveDate;
use serde::Serialize;

/// Caller-resolved input for one activity line, before impact is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryDraft {
    pub category: String,
    pub item: String,
    pub quantity: f64,
    pub unit: String,
    pub factor: f64,
    /// Clamped to `0..=100` when the entry is recorded.
    pub uncertainty_pct: i64,
    pub detail: String,
}

impl EntryDraft {
    pub fn new(
        category: impl Into<String>,
        item: impl Into<String>,
        quantity: f64,
        unit: impl Into<String>,
        factor: f64,
    ) -> Self {
        Self {
            category: category.into(),
            item: item.into(),
            quantity,
            unit: unit.into(),
            factor,
            uncertainty_pct: 0,
            detail: String::new(),
        }
    }

    pub fn with_uncertainty(mut self, uncertainty_pct: i64) -> Self {
        self.uncertainty_pct = uncertainty_pct;
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = detail.into();
        self
    }
}

/// One measured activity converted into an emissions line item.
///
/// `impact_kgco2` and `margin_kgco2` are caches derived at construction time. There is no
/// setter for any field; corrections are new entries or a full ledger replacement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    category: String,
    item: String,
    quantity: f64,
    unit: String,
    factor: f64,
    impact_kgco2: f64,
    uncertainty_pct: u8,
    margin_kgco2: f64,
    detail: String,
    date: NaiveDate,
}

/// Builds an entry from a draft: `impact = quantity * factor`,
/// `margin = impact * uncertainty / 100`.
pub fn record_entry(draft: EntryDraft, recorded_on: NaiveDate) -> Result<LedgerEntry, ValidationError> {
    let quantity = ensure_non_negative("quantity", draft.quantity)?;
    let factor = ensure_non_negative("factor", draft.factor)?;
    let uncertainty_pct = draft.uncertainty_pct.clamp(0, 100) as u8;
    ensure_finite("impact", quantity * factor)?;

    Ok(LedgerEntry::derive(
        draft.category,
        draft.item,
        quantity,
        draft.unit,
        factor,
        uncertainty_pct,
        draft.detail,
        recorded_on,
    ))
}

impl LedgerEntry {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn derive(
        category: String,
        item: String,
        quantity: f64,
        unit: String,
        factor: f64,
        uncertainty_pct: u8,
        detail: String,
        date: NaiveDate,
    ) -> Self {
        let impact_kgco2 = quantity * factor;
        let margin_kgco2 = impact_kgco2 * (uncertainty_pct as f64 / 100.0);
        Self {
            category,
            item,
            quantity,
            unit,
            factor,
            impact_kgco2,
            uncertainty_pct,
            margin_kgco2,
            detail,
            date,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn item(&self) -> &str {
        &self.item
    }

    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// The coefficient applied when the entry was recorded.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    pub fn impact_kgco2(&self) -> f64 {
        self.impact_kgco2
    }

    pub fn uncertainty_pct(&self) -> u8 {
        self.uncertainty_pct
    }

    pub fn margin_kgco2(&self) -> f64 {
        self.margin_kgco2
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Quantity with its unit, as shown in journals and exports.
    pub fn quantity_label(&self) -> String {
        if self.unit.is_empty() {
            format!("{}", self.quantity)
        } else {
            format!("{} {}", self.quantity, self.unit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).expect("valid date")
    }

    #[test]
    fn record_entry_derives_impact_and_margin() {
        let entry = record_entry(
            EntryDraft::new("Mobility", "Car trip", 1000.0, "km", 0.19).with_uncertainty(10),
            day(),
        )
        .expect("valid entry");

        assert!((entry.impact_kgco2() - 190.0).abs() < 1e-9);
        assert!((entry.margin_kgco2() - 19.0).abs() < 1e-9);
        assert_eq!(entry.date(), day());
        assert_eq!(entry.quantity_label(), "1000 km");
    }

    #[test]
    fn record_entry_rejects_overflowing_impact() {
        let error = record_entry(
            EntryDraft::new("Energy", "Meter glitch", 1e200, "kWh", 1e200),
            day(),
        )
        .expect_err("product overflows");
        assert_eq!(error, ValidationError::NonFinite { field: "impact" });
    }

    #[test]
    fn record_entry_clamps_uncertainty() {
        let high = record_entry(
            EntryDraft::new("Energy", "Gas", 10.0, "kWh", 1.0).with_uncertainty(250),
            day(),
        )
        .expect("clamped");
        assert_eq!(high.uncertainty_pct(), 100);
        assert!((high.margin_kgco2() - high.impact_kgco2()).abs() < 1e-9);

        let low = record_entry(
            EntryDraft::new("Energy", "Gas", 10.0, "kWh", 1.0).with_uncertainty(-5),
            day(),
        )
        .expect("clamped");
        assert_eq!(low.uncertainty_pct(), 0);
        assert_eq!(low.margin_kgco2(), 0.0);
    }

    #[test]
    fn record_entry_rejects_negative_and_non_finite_input() {
        let negative = record_entry(EntryDraft::new("Energy", "Gas", -1.0, "kWh", 0.2), day());
        assert!(matches!(
            negative,
            Err(ValidationError::Negative {
                field: "quantity",
                ..
            })
        ));

        let nan = record_entry(EntryDraft::new("Energy", "Gas", 1.0, "kWh", f64::NAN), day());
        assert_eq!(nan, Err(ValidationError::NonFinite { field: "factor" }));
    }

    #[test]
    fn zero_factor_is_allowed_for_zero_impact_items() {
        let entry = record_entry(EntryDraft::new("Purchases", "Donated desk", 3.0, "u", 0.0), day())
            .expect("zero factor accepted");
        assert_eq!(entry.impact_kgco2(), 0.0);
    }
}
