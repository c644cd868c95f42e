//! Ledger engine for the cashflow service.
//!
//! The engine owns the ledger store (flows, recurring flows, positions,
//! categories, users) and the monthly aggregation built on top of it: the
//! position walk behind reports and the workbook exporter.

pub use calendar::{Month, MonthsBack};
pub use categories::Category;
pub use error::EngineError;
pub use flows::{FlowEntry, FlowKind};
pub use ops::{
    Engine, EngineBuilder, Export, MonthSum, MonthTotals, MostPopular, PositionWalk, Report,
};
pub use positions::{OPEN_INTERVAL_DAYS, PositionEntry, PositionKind};
pub use recurring_flows::RecurringFlow;
pub use users::User;
pub use workbook::{CategoryKey, MonthSummary};

pub mod calendar;
mod categories;
mod error;
mod flows;
mod ops;
mod positions;
mod recurring_flows;
mod users;
mod util;
mod workbook;

type ResultEngine<T> = Result<T, EngineError>;
