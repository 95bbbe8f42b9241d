use super::money::Money;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which way a net balance points, from the subject's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// The subject owes the counterpart.
    Owes,
    /// The counterpart owes the subject.
    GetsBack,
}

/// One net pairwise balance, computed on demand and never persisted.
/// `amount` is always positive; the sign lives in `direction`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEntry {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_pubkey: String,
    pub user_avatar: Option<String>,
    #[schema(value_type = f64)]
    pub amount: Money,
    #[serde(rename = "type")]
    pub direction: Direction,
}
