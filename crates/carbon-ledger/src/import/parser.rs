use crate::accounting::domain::{parse_number, ValidationError};
use crate::accounting::ledger::EntryDraft;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Spreadsheet row; headers follow the export, with the older localised names accepted.
#[derive(Debug, Deserialize)]
pub(crate) struct LedgerRow {
    #[serde(alias = "Catégorie", default, deserialize_with = "empty_string_as_none")]
    category: Option<String>,
    #[serde(alias = "Item", default, deserialize_with = "empty_string_as_none")]
    item: Option<String>,
    #[serde(alias = "Quantité", default, deserialize_with = "empty_string_as_none")]
    quantity: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    unit: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    factor: Option<String>,
    #[serde(alias = "Incertitude", default, deserialize_with = "empty_string_as_none")]
    uncertainty_pct: Option<String>,
    #[serde(alias = "Détail", default, deserialize_with = "empty_string_as_none")]
    detail: Option<String>,
    #[serde(alias = "Date", default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
}

#[derive(Debug)]
pub(crate) enum RowError {
    Missing(&'static str),
    Invalid(ValidationError),
    Date(String),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RowError::Missing(column) => write!(f, "column '{}' is empty", column),
            RowError::Invalid(err) => write!(f, "{}", err),
            RowError::Date(raw) => write!(f, "date '{}' is not YYYY-MM-DD", raw),
        }
    }
}

impl From<ValidationError> for RowError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err)
    }
}

impl LedgerRow {
    pub(crate) fn into_draft(
        self,
        default_date: NaiveDate,
    ) -> Result<(EntryDraft, NaiveDate), RowError> {
        let category = self.category.ok_or(RowError::Missing("category"))?;
        let item = self.item.ok_or(RowError::Missing("item"))?;
        let quantity = parse_number(
            "quantity",
            self.quantity.as_deref().ok_or(RowError::Missing("quantity"))?,
        )?;
        let factor = parse_number(
            "factor",
            self.factor.as_deref().ok_or(RowError::Missing("factor"))?,
        )?;
        let uncertainty = match self.uncertainty_pct.as_deref() {
            Some(raw) => parse_number("uncertainty_pct", raw)?.round() as i64,
            None => 0,
        };
        let date = match self.date {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|_| RowError::Date(raw))?,
            None => default_date,
        };

        let draft = EntryDraft::new(
            category,
            item,
            quantity,
            self.unit.unwrap_or_default(),
            factor,
        )
        .with_uncertainty(uncertainty)
        .with_detail(self.detail.unwrap_or_default());

        Ok((draft, date))
    }
}

/// Finds the `Type`/`Status` column of a calendar export, ignoring case.
pub(crate) fn calendar_tally_column(headers: &csv::StringRecord) -> Option<usize> {
    const TALLY_HEADERS: &[&str] = &["type", "status", "statut"];
    headers
        .iter()
        .position(|header| TALLY_HEADERS.contains(&header.trim().to_lowercase().as_str()))
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
