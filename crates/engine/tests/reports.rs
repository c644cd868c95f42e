mod common;

use std::{
    io::Write,
    sync::{Arc, Mutex},
};

use common::{at, engine_with_owner};
use engine::{FlowKind, Month, MonthSum, PositionKind};

fn sums(series: &[MonthSum]) -> Vec<(&str, i64)> {
    series.iter().map(|m| (m.label.as_str(), m.sum)).collect()
}

#[tokio::test]
async fn owner_without_positions_has_empty_walk() {
    let (engine, owner) = engine_with_owner("empty_walk").await;
    engine
        .create_flow(FlowKind::Inflow, owner, at(2024, 3, 1), Some("Salary"), 1000)
        .await
        .unwrap();

    let months = engine
        .position_walk(owner, at(2024, 3, 20))
        .into_months()
        .await
        .unwrap();
    assert!(months.is_empty());

    let report = engine.report(owner, at(2024, 3, 20)).await.unwrap();
    assert!(report.assets.is_empty());
    assert!(report.liabilities.is_empty());
}

#[tokio::test]
async fn asset_opened_last_month_spans_two_months() {
    let (engine, owner) = engine_with_owner("asset_last_month").await;
    engine
        .create_position(PositionKind::Asset, owner, at(2024, 2, 10), "Deposit", 500, None)
        .await
        .unwrap();

    let mut walk = engine.position_walk(owner, at(2024, 3, 20));
    let march = walk.next_month().await.unwrap().unwrap();
    let february = walk.next_month().await.unwrap().unwrap();
    assert_eq!(march.month, Month::new(2024, 3).unwrap());
    assert_eq!(march.asset_total, 500);
    assert_eq!(february.label, "02.24");
    assert_eq!(february.asset_total, 500);
    assert_eq!(february.liability_total, 0);
    assert!(walk.next_month().await.unwrap().is_none());
    // The cursor stays exhausted.
    assert!(walk.next_month().await.unwrap().is_none());

    let report = engine.report(owner, at(2024, 3, 20)).await.unwrap();
    assert_eq!(sums(&report.assets), vec![("02.24", 500), ("03.24", 500)]);
    assert!(report.liabilities.is_empty());
}

#[tokio::test]
async fn series_skip_months_without_rows_of_their_kind() {
    let (engine, owner) = engine_with_owner("independent_series").await;
    engine
        .create_position(PositionKind::Asset, owner, at(2023, 12, 1), "Cash", 100, None)
        .await
        .unwrap();
    engine
        .create_position(PositionKind::Liability, owner, at(2024, 2, 1), "Card", 40, None)
        .await
        .unwrap();

    let report = engine.report(owner, at(2024, 2, 20)).await.unwrap();
    assert_eq!(
        sums(&report.assets),
        vec![("12.23", 100), ("01.24", 100), ("02.24", 100)]
    );
    assert_eq!(sums(&report.liabilities), vec![("02.24", 40)]);
}

#[tokio::test]
async fn report_covers_the_most_recent_months() {
    let (engine, owner) = engine_with_owner("report_window").await;
    engine
        .create_position(PositionKind::Asset, owner, at(2022, 1, 1), "Flat", 9000, None)
        .await
        .unwrap();

    let report = engine.report(owner, at(2024, 6, 20)).await.unwrap();
    assert_eq!(report.assets.len(), 12);
    assert_eq!(report.assets.first().map(|m| m.label.as_str()), Some("07.23"));
    assert_eq!(report.assets.last().map(|m| m.label.as_str()), Some("06.24"));

    let months = engine
        .position_walk(owner, at(2024, 6, 20))
        .into_months()
        .await
        .unwrap();
    assert_eq!(months.len(), 30);
}

#[tokio::test]
async fn revalued_position_changes_the_series() {
    let (engine, owner) = engine_with_owner("revalued_series").await;
    let deposit = engine
        .create_position(PositionKind::Asset, owner, at(2024, 1, 10), "Deposit", 100, None)
        .await
        .unwrap();
    engine
        .revalue_position(
            PositionKind::Asset,
            owner,
            deposit.id,
            250,
            None,
            None,
            at(2024, 3, 2),
        )
        .await
        .unwrap();

    let report = engine.report(owner, at(2024, 3, 20)).await.unwrap();
    assert_eq!(
        sums(&report.assets),
        vec![("01.24", 100), ("02.24", 100), ("03.24", 250)]
    );
}

#[tokio::test]
async fn recurring_matches_follow_descriptions_per_kind() {
    let (engine, owner) = engine_with_owner("recurring_matches").await;
    engine
        .create_recurring(FlowKind::Outflow, owner, Some("Rent"), 400)
        .await
        .unwrap();
    engine
        .create_recurring(FlowKind::Inflow, owner, Some("Salary"), 1000)
        .await
        .unwrap();

    engine
        .create_flow(FlowKind::Outflow, owner, at(2024, 3, 1), Some("Rent"), 400)
        .await
        .unwrap();
    engine
        .create_flow(FlowKind::Outflow, owner, at(2024, 2, 1), Some("Rent"), 390)
        .await
        .unwrap();
    engine
        .create_flow(FlowKind::Outflow, owner, at(2024, 2, 3), Some("Coffee"), 5)
        .await
        .unwrap();
    // Same description, other kind: not a recurring outflow match.
    engine
        .create_flow(FlowKind::Inflow, owner, at(2024, 2, 5), Some("Rent"), 50)
        .await
        .unwrap();
    engine
        .create_flow(FlowKind::Inflow, owner, at(2024, 3, 5), Some("Salary"), 1000)
        .await
        .unwrap();

    let report = engine.report(owner, at(2024, 3, 20)).await.unwrap();
    let outflows: Vec<i64> = report.recurring_outflows.iter().map(|e| e.amount).collect();
    assert_eq!(outflows, vec![390, 400]);
    assert_eq!(report.recurring_inflows.len(), 1);
    let salary = &report.recurring_inflows[0];
    assert_eq!(salary.description, "Salary");
    assert_eq!(salary.amount, 1000);
    assert_eq!(salary.kind, FlowKind::Inflow);
}

/// Log sink shared with a test subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

#[tokio::test]
async fn walk_logs_each_month_with_totals() {
    let (engine, owner) = engine_with_owner("walk_logging").await;
    engine
        .create_position(PositionKind::Asset, owner, at(2024, 2, 10), "Deposit", 500, None)
        .await
        .unwrap();
    engine
        .create_position(PositionKind::Liability, owner, at(2024, 3, 2), "Card", 40, None)
        .await
        .unwrap();

    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let months = engine
        .position_walk(owner, at(2024, 3, 20))
        .into_months()
        .await
        .unwrap();
    assert_eq!(months.len(), 2);

    let output = logs.contents();
    let walked: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("walked month"))
        .collect();
    assert_eq!(walked.len(), 2);
    assert!(walked[0].contains("month=03.24"));
    assert!(walked[0].contains("asset_total=500"));
    assert!(walked[0].contains("liability_total=40"));
    assert!(walked[1].contains("month=02.24"));
    assert!(walked[1].contains("liability_total=0"));
    assert!(output.contains("position walk ended"));
}
