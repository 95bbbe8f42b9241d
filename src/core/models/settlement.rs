use super::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A direct payment between two users. Immutable once recorded; there is no
/// edit path.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Settlement {
    pub id: String,
    pub group_id: Option<String>,
    pub from_user_id: String,
    pub to_user_id: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub date: DateTime<Utc>,
    pub notes: Option<String>,
    pub transaction_reference: Option<String>,
    #[schema(value_type = String, example = "2024-06-01T12:34:56Z")]
    pub created_at: DateTime<Utc>,
}
