//! Workbook layout for exports.
//!
//! Every exported month gets a sheet named `YYYY-MM`: flows in columns A/B,
//! positions and the per-category breakdown in columns D/E. A pivot sheet
//! (`Свод`) comes first with one row per month.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::{Category, FlowEntry, Month, PositionEntry};

pub(crate) const PIVOT_SHEET: &str = "Свод";

const DATE_HEADER: &str = "Дата";
const INFLOW_HEADER: &str = "Доходы";
const OUTFLOW_HEADER: &str = "Расходы";
const CASHFLOW_LABEL: &str = "Денежный поток";
const ASSET_HEADER: &str = "Активы";
const LIABILITY_HEADER: &str = "Пассивы";
const CAPITAL_LABEL: &str = "Капитал";
const BY_CATEGORY_HEADER: &str = "По категориям";
const UNCATEGORIZED_ASSETS: &str = "Активы без категории";
const UNCATEGORIZED_LIABILITIES: &str = "Пассивы без категории";

const FLOW_COL: u16 = 0;
const POSITION_COL: u16 = 3;
const LABEL_WIDTH: f64 = 32.0;

/// Column key of the per-category breakdown.
///
/// The derived order is the column order of the pivot sheet: categories by
/// id (creation order), then the two uncategorised buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CategoryKey {
    Category(i64),
    UncategorizedAssets,
    UncategorizedLiabilities,
}

/// Totals of one exported month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthSummary {
    pub month: Month,
    pub inflow_total: i64,
    pub outflow_total: i64,
    pub cashflow: i64,
    pub asset_total: i64,
    pub liability_total: i64,
    pub capital: i64,
    /// Net value per category (`assets - liabilities`); uncategorised
    /// assets and liabilities are kept apart.
    pub by_category: BTreeMap<CategoryKey, i64>,
}

/// Rows and totals rendered into one month sheet.
pub(crate) struct MonthSheet {
    pub(crate) summary: MonthSummary,
    inflows: Vec<FlowEntry>,
    outflows: Vec<FlowEntry>,
    assets: Vec<PositionEntry>,
    liabilities: Vec<PositionEntry>,
}

impl MonthSheet {
    pub(crate) fn new(
        month: Month,
        inflows: Vec<FlowEntry>,
        outflows: Vec<FlowEntry>,
        assets: Vec<PositionEntry>,
        liabilities: Vec<PositionEntry>,
    ) -> Self {
        let inflow_total: i64 = inflows.iter().map(|e| e.amount).sum();
        let outflow_total: i64 = outflows.iter().map(|e| e.amount).sum();
        let asset_total: i64 = assets.iter().map(|p| p.amount).sum();
        let liability_total: i64 = liabilities.iter().map(|p| p.amount).sum();

        let summary = MonthSummary {
            month,
            inflow_total,
            outflow_total,
            cashflow: inflow_total - outflow_total,
            asset_total,
            liability_total,
            capital: asset_total - liability_total,
            by_category: category_breakdown(&assets, &liabilities),
        };

        Self {
            summary,
            inflows,
            outflows,
            assets,
            liabilities,
        }
    }
}

fn category_breakdown(
    assets: &[PositionEntry],
    liabilities: &[PositionEntry],
) -> BTreeMap<CategoryKey, i64> {
    let mut breakdown = BTreeMap::new();
    for asset in assets {
        let key = asset
            .category_id
            .map_or(CategoryKey::UncategorizedAssets, CategoryKey::Category);
        *breakdown.entry(key).or_default() += asset.amount;
    }
    for liability in liabilities {
        match liability.category_id {
            Some(id) => {
                *breakdown.entry(CategoryKey::Category(id)).or_default() -= liability.amount
            }
            None => {
                *breakdown
                    .entry(CategoryKey::UncategorizedLiabilities)
                    .or_default() += liability.amount
            }
        }
    }
    breakdown
}

/// Display names for category keys.
pub(crate) struct CategoryLabels {
    labels: HashMap<i64, String>,
}

impl CategoryLabels {
    pub(crate) fn new(categories: &[Category]) -> Self {
        Self {
            labels: categories
                .iter()
                .map(|c| (c.id, c.label.clone()))
                .collect(),
        }
    }

    fn label(&self, key: CategoryKey) -> String {
        match key {
            CategoryKey::Category(id) => self
                .labels
                .get(&id)
                .cloned()
                .unwrap_or_else(|| format!("#{id}")),
            CategoryKey::UncategorizedAssets => UNCATEGORIZED_ASSETS.to_string(),
            CategoryKey::UncategorizedLiabilities => UNCATEGORIZED_LIABILITIES.to_string(),
        }
    }
}

/// Render the pivot sheet followed by one sheet per month. `sheets` must
/// be in chronological order.
pub(crate) fn render(
    sheets: &[MonthSheet],
    labels: &CategoryLabels,
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    workbook.push_worksheet(pivot_sheet(sheets, labels)?);
    for sheet in sheets {
        workbook.push_worksheet(month_sheet(sheet, labels)?);
    }
    workbook.save_to_buffer()
}

/// Category columns of the pivot sheet: every category seen in any month,
/// then the two fixed uncategorised columns.
fn pivot_columns(sheets: &[MonthSheet]) -> Vec<CategoryKey> {
    let seen: BTreeSet<CategoryKey> = sheets
        .iter()
        .flat_map(|s| s.summary.by_category.keys().copied())
        .filter(|key| matches!(key, CategoryKey::Category(_)))
        .collect();
    seen.into_iter()
        .chain([
            CategoryKey::UncategorizedAssets,
            CategoryKey::UncategorizedLiabilities,
        ])
        .collect()
}

fn pivot_sheet(sheets: &[MonthSheet], labels: &CategoryLabels) -> Result<Worksheet, XlsxError> {
    let bold = Format::new().set_bold();
    let mut worksheet = Worksheet::new();
    worksheet.set_name(PIVOT_SHEET)?;

    let columns = pivot_columns(sheets);
    let fixed = [
        DATE_HEADER,
        INFLOW_HEADER,
        OUTFLOW_HEADER,
        CASHFLOW_LABEL,
        ASSET_HEADER,
        LIABILITY_HEADER,
        CAPITAL_LABEL,
    ];
    for (col, header) in fixed.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &bold)?;
    }
    let first_category_col = fixed.len() as u16;
    for (offset, key) in columns.iter().enumerate() {
        worksheet.write_string_with_format(
            0,
            first_category_col + offset as u16,
            labels.label(*key),
            &bold,
        )?;
    }

    for (index, sheet) in sheets.iter().enumerate() {
        let row = index as u32 + 1;
        let summary = &sheet.summary;
        worksheet.write_string(row, 0, summary.month.sheet_name())?;
        let totals = [
            summary.inflow_total,
            summary.outflow_total,
            summary.cashflow,
            summary.asset_total,
            summary.liability_total,
            summary.capital,
        ];
        for (offset, value) in totals.iter().enumerate() {
            worksheet.write_number(row, 1 + offset as u16, *value as f64)?;
        }
        for (offset, key) in columns.iter().enumerate() {
            let value = summary.by_category.get(key).copied().unwrap_or(0);
            worksheet.write_number(row, first_category_col + offset as u16, value as f64)?;
        }
    }

    worksheet.set_column_width(0, 12)?;
    Ok(worksheet)
}

fn month_sheet(sheet: &MonthSheet, labels: &CategoryLabels) -> Result<Worksheet, XlsxError> {
    let bold = Format::new().set_bold();
    let summary = &sheet.summary;
    let mut worksheet = Worksheet::new();
    worksheet.set_name(summary.month.sheet_name())?;
    worksheet.set_column_width(FLOW_COL, LABEL_WIDTH)?;
    worksheet.set_column_width(POSITION_COL, LABEL_WIDTH)?;

    let mut row = 0;
    let inflows = flow_rows(&sheet.inflows);
    let outflows = flow_rows(&sheet.outflows);
    row = write_block(&mut worksheet, row, FLOW_COL, INFLOW_HEADER, &inflows, &bold)?;
    row = write_block(&mut worksheet, row, FLOW_COL, OUTFLOW_HEADER, &outflows, &bold)?;
    write_total(&mut worksheet, row, FLOW_COL, CASHFLOW_LABEL, summary.cashflow, &bold)?;

    let mut row = 0;
    let assets = position_rows(&sheet.assets);
    let liabilities = position_rows(&sheet.liabilities);
    row = write_block(&mut worksheet, row, POSITION_COL, ASSET_HEADER, &assets, &bold)?;
    row = write_block(&mut worksheet, row, POSITION_COL, LIABILITY_HEADER, &liabilities, &bold)?;
    row = write_total(&mut worksheet, row, POSITION_COL, CAPITAL_LABEL, summary.capital, &bold)?;

    let by_category: Vec<(String, i64)> = summary
        .by_category
        .iter()
        .map(|(key, value)| (labels.label(*key), *value))
        .collect();
    write_block(
        &mut worksheet,
        row,
        POSITION_COL,
        BY_CATEGORY_HEADER,
        &by_category,
        &bold,
    )?;

    Ok(worksheet)
}

fn flow_rows(entries: &[FlowEntry]) -> Vec<(String, i64)> {
    entries
        .iter()
        .map(|e| (e.description.clone(), e.amount))
        .collect()
}

fn position_rows(entries: &[PositionEntry]) -> Vec<(String, i64)> {
    entries
        .iter()
        .map(|p| (p.description.clone(), p.amount))
        .collect()
}

/// Bold header followed by `label | amount` rows. Returns the next free row.
fn write_block(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    header: &str,
    rows: &[(String, i64)],
    bold: &Format,
) -> Result<u32, XlsxError> {
    worksheet.write_string_with_format(row, col, header, bold)?;
    let mut row = row + 1;
    for (label, amount) in rows {
        worksheet.write_string(row, col, label)?;
        worksheet.write_number(row, col + 1, *amount as f64)?;
        row += 1;
    }
    Ok(row)
}

/// Bold `label | value` total row. Returns the next free row.
fn write_total(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    label: &str,
    value: i64,
    bold: &Format,
) -> Result<u32, XlsxError> {
    worksheet.write_string_with_format(row, col, label, bold)?;
    worksheet.write_number_with_format(row, col + 1, value as f64, bold)?;
    Ok(row + 1)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::{FlowKind, PositionKind};

    fn flow(kind: FlowKind, description: &str, amount: i64) -> FlowEntry {
        FlowEntry {
            id: 0,
            kind,
            date: Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap(),
            description: description.to_string(),
            amount,
            owner_id: 1,
        }
    }

    fn position(
        kind: PositionKind,
        description: &str,
        amount: i64,
        category_id: Option<i64>,
    ) -> PositionEntry {
        let date_in = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        PositionEntry {
            id: 0,
            kind,
            date_in,
            date_out: crate::positions::open_date_out(date_in).unwrap(),
            description: description.to_string(),
            amount,
            category_id,
            owner_id: 1,
        }
    }

    fn category(id: i64, label: &str) -> Category {
        Category {
            id,
            label: label.to_string(),
            owner_id: 1,
        }
    }

    fn sample_sheets() -> Vec<MonthSheet> {
        vec![
            MonthSheet::new(
                Month::new(2024, 2).unwrap(),
                vec![flow(FlowKind::Inflow, "Salary", 1000)],
                vec![],
                vec![position(PositionKind::Asset, "Flat", 5000, Some(2))],
                vec![],
            ),
            MonthSheet::new(
                Month::new(2024, 3).unwrap(),
                vec![
                    flow(FlowKind::Inflow, "Salary", 1000),
                    flow(FlowKind::Inflow, "Bonus", 200),
                ],
                vec![flow(FlowKind::Outflow, "Rent", 400)],
                vec![
                    position(PositionKind::Asset, "Flat", 5000, Some(2)),
                    position(PositionKind::Asset, "Cash", 300, None),
                ],
                vec![position(PositionKind::Liability, "Mortgage", 3000, Some(2))],
            ),
        ]
    }

    fn open(bytes: Vec<u8>) -> Xlsx<Cursor<Vec<u8>>> {
        open_workbook_from_rs(Cursor::new(bytes)).unwrap()
    }

    /// Value next to `label` in column `col`.
    fn value_right_of(range: &Range<Data>, col: usize, label: &str) -> Option<f64> {
        range.rows().find_map(|row| match (row.get(col), row.get(col + 1)) {
            (Some(Data::String(text)), Some(Data::Float(value))) if text == label => Some(*value),
            _ => None,
        })
    }

    #[test]
    fn breakdown_nets_liabilities_inside_categories() {
        let sheets = sample_sheets();
        let march = &sheets[1].summary;
        assert_eq!(march.by_category.get(&CategoryKey::Category(2)), Some(&2000));
        assert_eq!(
            march.by_category.get(&CategoryKey::UncategorizedAssets),
            Some(&300)
        );
        assert_eq!(
            march.by_category.get(&CategoryKey::UncategorizedLiabilities),
            None
        );
        assert_eq!(march.cashflow, 800);
        assert_eq!(march.capital, 2300);
    }

    #[test]
    fn pivot_sheet_comes_first_with_fixed_columns() {
        let labels = CategoryLabels::new(&[category(1, "Unused"), category(2, "Realty")]);
        let bytes = render(&sample_sheets(), &labels).unwrap();
        let mut workbook = open(bytes);

        assert_eq!(workbook.sheet_names(), vec![PIVOT_SHEET, "2024-02", "2024-03"]);

        let pivot = workbook.worksheet_range(PIVOT_SHEET).unwrap();
        let headers: Vec<String> = (0..10)
            .filter_map(|col| match pivot.get_value((0, col)) {
                Some(Data::String(text)) => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(
            headers,
            vec![
                DATE_HEADER,
                INFLOW_HEADER,
                OUTFLOW_HEADER,
                CASHFLOW_LABEL,
                ASSET_HEADER,
                LIABILITY_HEADER,
                CAPITAL_LABEL,
                "Realty",
                UNCATEGORIZED_ASSETS,
                UNCATEGORIZED_LIABILITIES,
            ]
        );

        assert_eq!(
            pivot.get_value((1, 0)),
            Some(&Data::String("2024-02".to_string()))
        );
        // February has no uncategorised assets: rendered as 0.
        assert_eq!(pivot.get_value((1, 8)), Some(&Data::Float(0.0)));
        assert_eq!(pivot.get_value((2, 3)), Some(&Data::Float(800.0)));
        assert_eq!(pivot.get_value((2, 7)), Some(&Data::Float(2000.0)));
    }

    #[test]
    fn month_sheet_layout() {
        let labels = CategoryLabels::new(&[category(2, "Realty")]);
        let bytes = render(&sample_sheets(), &labels).unwrap();
        let mut workbook = open(bytes);
        let march = workbook.worksheet_range("2024-03").unwrap();

        assert_eq!(
            march.get_value((0, 0)),
            Some(&Data::String(INFLOW_HEADER.to_string()))
        );
        assert_eq!(
            march.get_value((3, 0)),
            Some(&Data::String(OUTFLOW_HEADER.to_string()))
        );
        assert_eq!(value_right_of(&march, 0, "Rent"), Some(400.0));
        assert_eq!(value_right_of(&march, 0, CASHFLOW_LABEL), Some(800.0));
        assert_eq!(
            march.get_value((0, 3)),
            Some(&Data::String(ASSET_HEADER.to_string()))
        );
        assert_eq!(value_right_of(&march, 3, "Mortgage"), Some(3000.0));
        assert_eq!(value_right_of(&march, 3, CAPITAL_LABEL), Some(2300.0));
        assert_eq!(value_right_of(&march, 3, "Realty"), Some(2000.0));
        assert_eq!(value_right_of(&march, 3, UNCATEGORIZED_ASSETS), Some(300.0));
    }

    #[test]
    fn empty_export_has_only_pivot_headers() {
        let labels = CategoryLabels::new(&[]);
        let bytes = render(&[], &labels).unwrap();
        let mut workbook = open(bytes);
        assert_eq!(workbook.sheet_names(), vec![PIVOT_SHEET]);
        let pivot = workbook.worksheet_range(PIVOT_SHEET).unwrap();
        assert_eq!(pivot.height(), 1);
    }
}
