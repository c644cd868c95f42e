use std::path::{Path, PathBuf};

use sea_orm::DatabaseConnection;

mod categories;
mod export;
mod flows;
mod positions;
mod recurring;
mod reports;
mod users;

pub use export::Export;
pub use flows::MostPopular;
pub use reports::{MonthSum, MonthTotals, PositionWalk, Report};

/// Upper bound on the months a backward walk may visit.
pub(crate) const MAX_WALK_MONTHS: usize = 1200;

const DEFAULT_EXPORT_DIR: &str = "static/export";
const DEFAULT_REPORT_MONTHS: usize = 12;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    export_dir: PathBuf,
    report_months: usize,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Directory the exporter writes workbooks into.
    pub fn export_dir(&self) -> &Path {
        &self.export_dir
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    export_dir: Option<PathBuf>,
    report_months: Option<usize>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Directory for generated workbooks (default `static/export`).
    pub fn export_dir(mut self, dir: impl Into<PathBuf>) -> EngineBuilder {
        self.export_dir = Some(dir.into());
        self
    }

    /// How many recent months a report covers (default 12).
    pub fn report_months(mut self, months: usize) -> EngineBuilder {
        self.report_months = Some(months);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            export_dir: self
                .export_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_DIR)),
            report_months: self.report_months.unwrap_or(DEFAULT_REPORT_MONTHS),
        })
    }
}
