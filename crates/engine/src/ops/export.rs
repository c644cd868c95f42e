use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::{
    FlowKind, Month, MonthSummary, PositionKind, ResultEngine,
    workbook::{self, CategoryLabels, MonthSheet},
};

use super::{Engine, MAX_WALK_MONTHS};

/// A workbook written to the export directory.
#[derive(Clone, Debug)]
pub struct Export {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
    /// Exported months in chronological order.
    pub months: Vec<MonthSummary>,
}

impl Export {
    /// Name of the file written for `owner_id`; each export overwrites it.
    pub fn file_name(owner_id: i64) -> String {
        format!("cashflow{owner_id}.xlsx")
    }
}

impl Engine {
    /// Build the owner's workbook and write it to the export directory.
    pub async fn export(&self, owner_id: i64, now: DateTime<Utc>) -> ResultEngine<Export> {
        let sheets = self.export_months(owner_id, now).await?;
        let categories = self.list_categories(owner_id).await?;
        let bytes = workbook::render(&sheets, &CategoryLabels::new(&categories))?;

        tokio::fs::create_dir_all(&self.export_dir).await?;
        let path = self.export_dir.join(Export::file_name(owner_id));
        tokio::fs::write(&path, &bytes).await?;
        tracing::info!(owner_id, months = sheets.len(), path = %path.display(), "workbook exported");

        Ok(Export {
            path,
            bytes,
            months: sheets.into_iter().map(|sheet| sheet.summary).collect(),
        })
    }

    /// Walk back from `now` until a month without flows, oldest month first.
    ///
    /// Unlike the position walk, the export stops on flows: a month with
    /// positions but no inflow or outflow ends it.
    async fn export_months(
        &self,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<MonthSheet>> {
        let mut sheets = Vec::new();
        for month in Month::containing(now).walk_back().take(MAX_WALK_MONTHS) {
            let (begin, end) = (month.begin(), month.end());
            let inflows = self.list_flows(FlowKind::Inflow, owner_id, begin, end).await?;
            let outflows = self.list_flows(FlowKind::Outflow, owner_id, begin, end).await?;
            let assets = self
                .positions_at(PositionKind::Asset, owner_id, month.probe())
                .await?;
            let liabilities = self
                .positions_at(PositionKind::Liability, owner_id, month.probe())
                .await?;

            let flow_total: i64 = inflows.iter().chain(&outflows).map(|e| e.amount).sum();
            if flow_total == 0 {
                if !assets.is_empty() || !liabilities.is_empty() {
                    tracing::warn!(
                        owner_id,
                        month = %month.sheet_name(),
                        "export stopped at a month without flows that still holds positions"
                    );
                }
                break;
            }

            sheets.push(MonthSheet::new(month, inflows, outflows, assets, liabilities));
        }
        sheets.reverse();
        Ok(sheets)
    }
}
