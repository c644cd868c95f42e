use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// `?id=` selector used by delete endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct IdQuery {
    pub id: i64,
}

/// Inclusive `[date_in, date_out]` filter. Missing bounds default to the
/// current month.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RangeQuery {
    pub date_in: Option<DateTime<FixedOffset>>,
    pub date_out: Option<DateTime<FixedOffset>>,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub username: String,
        pub email: String,
        pub password: String,
        /// Required when the server is configured with an invite code.
        pub invite: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct User {
        pub id: i64,
        pub username: String,
        pub email: String,
    }
}

pub mod flow {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct FlowNew {
        /// RFC3339 timestamp; defaults to now.
        pub date: Option<DateTime<FixedOffset>>,
        /// Blank or missing descriptions get the kind's default.
        pub description: Option<String>,
        pub sum: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Flow {
        pub id: i64,
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub sum: i64,
        pub owner_id: i64,
    }
}

pub mod recurring {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecurringNew {
        pub description: Option<String>,
        pub sum: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecurringUpdate {
        pub id: i64,
        pub description: Option<String>,
        pub sum: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Recurring {
        pub id: i64,
        pub description: String,
        pub sum: i64,
        pub owner_id: i64,
    }
}

pub mod position {
    use super::*;

    /// `?date=` filter; defaults to now.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PositionQuery {
        pub date: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PositionNew {
        /// Any instant of the opening month; defaults to now.
        pub date: Option<DateTime<FixedOffset>>,
        pub description: String,
        /// Must be > 0.
        pub sum: i64,
        pub category_id: Option<i64>,
    }

    /// Revalue a position. A `sum` of 0 closes it.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PositionUpdate {
        pub id: i64,
        pub sum: i64,
        pub description: Option<String>,
        pub category_id: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Position {
        pub id: i64,
        pub date_in: DateTime<FixedOffset>,
        pub date_out: DateTime<FixedOffset>,
        pub description: String,
        pub sum: i64,
        pub category_id: Option<i64>,
        pub owner_id: i64,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub label: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDelete {
        pub category_id: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Category {
        pub id: i64,
        pub label: String,
        pub owner_id: i64,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthSum {
        /// `MM.YY`
        pub label: String,
        pub sum: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RecurringMatch {
        pub date: DateTime<FixedOffset>,
        pub description: String,
        pub sum: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Report {
        pub assets: Vec<MonthSum>,
        pub liabilities: Vec<MonthSum>,
        pub recurring_inflows: Vec<RecurringMatch>,
        pub recurring_outflows: Vec<RecurringMatch>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MostPopular {
        pub inflow: Vec<String>,
        pub outflow: Vec<String>,
    }
}
