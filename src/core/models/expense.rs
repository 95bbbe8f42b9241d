use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SplitType {
    Equally,
    Unequally,
    Percentage,
}

impl Default for SplitType {
    fn default() -> Self {
        SplitType::Equally
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Expense {
    pub id: String,
    pub group_id: Option<String>,
    pub description: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    pub paid_by: String,
    pub split_type: SplitType,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub category: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub updated_at: DateTime<Utc>,
}

/// One participant's slice of an expense. `share` is what the participant is
/// responsible for; `paid_share` is what they chipped in at payment time.
/// A row may belong to the payer themselves (self-share).
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExpenseParticipant {
    pub expense_id: String,
    pub user_id: String,
    #[schema(value_type = f64)]
    pub share: Money,
    #[schema(value_type = f64)]
    pub paid_share: Money,
}

/// An expense enriched with payer and participant display data, as returned
/// by the expense listing endpoints.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ExpenseDetail {
    #[serde(flatten)]
    pub expense: Expense,
    pub paid_by_name: String,
    pub paid_by_pubkey: String,
    pub participants: Vec<ExpenseParticipant>,
}
