use super::money::Money;
use super::settlement::Settlement;
use super::user::UserSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    ExpenseAdded,
    ExpenseEdited,
    ExpenseDeleted,
    PaymentMade,
}

/// A feed entry derived from an expense or settlement write. Never read back
/// by the balance engine.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Activity {
    pub id: String,
    pub kind: ActivityKind,
    pub user_id: String,
    pub group_id: Option<String>,
    pub expense_id: Option<String>,
    pub settlement_id: Option<String>,
    pub description: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}

/// An activity enriched with actor display data and, for payments, the
/// underlying settlement.
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct ActivityDetail {
    #[serde(flatten)]
    pub activity: Activity,
    pub user_name: String,
    pub user_pubkey: String,
    pub user_avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement: Option<Settlement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_reference: Option<String>,
}

impl ActivityDetail {
    pub fn new(activity: Activity, user: &UserSummary, settlement: Option<Settlement>) -> Self {
        ActivityDetail {
            transaction_reference: settlement.as_ref().and_then(|s| s.transaction_reference.clone()),
            user_name: user.name.clone(),
            user_pubkey: user.pubkey.clone(),
            user_avatar: user.avatar.clone(),
            settlement,
            activity,
        }
    }
}
