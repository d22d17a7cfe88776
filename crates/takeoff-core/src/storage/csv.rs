//! CSV export of an estimate.

use std::path::Path;
use std::str::FromStr;

use takeoff_engine::engine::SubItemResult;

use crate::error::{Result, TakeoffError};
use crate::estimate::EstimateItem;

/// A column the user can show or hide. `QuantityDisplay` expands to two CSV
/// columns, Quantity and Unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CsvColumn {
    Group,
    Name,
    Type,
    QuantityDisplay,
    UnitPrice,
    GrandTotal,
}

impl CsvColumn {
    /// Every column, in output order.
    pub const ALL: [CsvColumn; 6] = [
        CsvColumn::Group,
        CsvColumn::Name,
        CsvColumn::Type,
        CsvColumn::QuantityDisplay,
        CsvColumn::UnitPrice,
        CsvColumn::GrandTotal,
    ];

    pub fn id(self) -> &'static str {
        match self {
            CsvColumn::Group => "group",
            CsvColumn::Name => "name",
            CsvColumn::Type => "type",
            CsvColumn::QuantityDisplay => "quantityDisplay",
            CsvColumn::UnitPrice => "unitPrice",
            CsvColumn::GrandTotal => "grandTotal",
        }
    }

    fn headers(self) -> &'static [&'static str] {
        match self {
            CsvColumn::Group => &["Group"],
            CsvColumn::Name => &["Name"],
            CsvColumn::Type => &["Type"],
            CsvColumn::QuantityDisplay => &["Quantity", "Unit"],
            CsvColumn::UnitPrice => &["Unit Price"],
            CsvColumn::GrandTotal => &["Total"],
        }
    }

    fn item_fields(self, item: &EstimateItem) -> Vec<String> {
        match self {
            CsvColumn::Group => vec![escape_text(&item.group)],
            CsvColumn::Name => vec![escape_text(&item.name)],
            CsvColumn::Type => vec![escape_text(item.kind.as_str())],
            CsvColumn::QuantityDisplay => {
                vec![item.quantity.to_string(), escape_text(&item.unit)]
            }
            CsvColumn::UnitPrice => vec![item.unit_price.to_string()],
            CsvColumn::GrandTotal => vec![item.grand_total.to_string()],
        }
    }

    fn sub_item_fields(self, sub: &SubItemResult, parent: &EstimateItem) -> Vec<String> {
        match self {
            CsvColumn::Group => vec![escape_text(&parent.group)],
            CsvColumn::Name => vec![escape_text(&format!("  ↳ {}", sub.name))],
            CsvColumn::Type => vec!["Sub-item".to_string()],
            CsvColumn::QuantityDisplay => {
                vec![sub.quantity.to_string(), escape_text(&sub.unit)]
            }
            CsvColumn::UnitPrice => vec![sub.unit_price.to_string()],
            CsvColumn::GrandTotal => vec![sub.total.to_string()],
        }
    }
}

impl FromStr for CsvColumn {
    type Err = TakeoffError;

    fn from_str(s: &str) -> Result<Self> {
        CsvColumn::ALL
            .into_iter()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TakeoffError::UnknownColumn(s.to_string()))
    }
}

/// Parse a list of column ids such as `["name", "grandTotal"]`.
pub fn parse_columns<S: AsRef<str>>(ids: &[S]) -> Result<Vec<CsvColumn>> {
    ids.iter().map(|id| id.as_ref().parse()).collect()
}

/// Escape a text field for CSV output.
fn escape_text(field: &str) -> String {
    // Guard against CSV formula injection in spreadsheet apps.
    let first_non_space = field.trim_start_matches([' ', '\t']).chars().next();
    let safe_field = if matches!(first_non_space, Some('=' | '+' | '-' | '@')) {
        format!("'{}", field)
    } else {
        field.to_string()
    };

    if safe_field.contains(',')
        || safe_field.contains('"')
        || safe_field.contains('\n')
        || safe_field.contains('\r')
    {
        format!("\"{}\"", safe_field.replace('"', "\"\""))
    } else {
        safe_field
    }
}

/// CSV text for `items`, one row per item followed by its sub-item rows.
///
/// Columns always appear in [`CsvColumn::ALL`] order; `visible` only picks
/// which of them are written. Rows are joined with `\n`, no trailing newline.
pub fn generate_estimates_csv(items: &[EstimateItem], visible: &[CsvColumn]) -> String {
    let columns: Vec<CsvColumn> = CsvColumn::ALL
        .into_iter()
        .filter(|c| visible.contains(c))
        .collect();

    let header: Vec<&str> = columns.iter().flat_map(|c| c.headers().iter().copied()).collect();
    let mut lines = vec![header.join(",")];

    for item in items {
        let row: Vec<String> = columns.iter().flat_map(|c| c.item_fields(item)).collect();
        lines.push(row.join(","));
        for sub in &item.sub_items {
            let row: Vec<String> = columns
                .iter()
                .flat_map(|c| c.sub_item_fields(sub, item))
                .collect();
            lines.push(row.join(","));
        }
    }

    lines.join("\n")
}

/// Write the estimate to `path`. An empty estimate is an error, not an
/// empty file.
pub fn write_estimates_csv(path: &Path, items: &[EstimateItem], visible: &[CsvColumn]) -> Result<()> {
    if items.is_empty() {
        return Err(TakeoffError::EmptyEstimate);
    }
    let mut content = generate_estimates_csv(items, visible);
    content.push('\n');
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), items = items.len(), "wrote estimate csv");
    Ok(())
}
