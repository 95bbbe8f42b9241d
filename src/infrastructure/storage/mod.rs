use crate::core::errors::TallyError;
use crate::core::models::{
    activity::Activity,
    expense::{Expense, ExpenseParticipant},
    group::Group,
    money::Money,
    settlement::Settlement,
    user::{User, UserSummary},
};
use async_trait::async_trait;
use std::collections::HashMap;

/// The persistence layer holding expenses, participants, settlements, users,
/// groups, and the activity feed. The balance engine only ever reads from it;
/// derived balances are never written back.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User, TallyError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, TallyError>;
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, TallyError>;
    /// Batched display lookup keyed by the requested ids. Unknown ids are
    /// simply absent from the result.
    async fn get_users(&self, user_ids: &[String]) -> Result<HashMap<String, UserSummary>, TallyError>;

    async fn save_group(&self, group: Group) -> Result<(), TallyError>;
    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, TallyError>;
    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, TallyError>;

    async fn save_expense(&self, expense: Expense) -> Result<(), TallyError>;
    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, TallyError>;
    async fn delete_expense(&self, expense_id: &str) -> Result<(), TallyError>;
    /// Every expense the user paid for or participates in, optionally
    /// restricted to one group scope, newest first.
    async fn list_expenses_involving(&self, user_id: &str, group_id: Option<&str>) -> Result<Vec<Expense>, TallyError>;

    async fn replace_participants(
        &self,
        expense_id: &str,
        participants: Vec<ExpenseParticipant>,
    ) -> Result<(), TallyError>;
    async fn list_participants(&self, expense_id: &str) -> Result<Vec<ExpenseParticipant>, TallyError>;
    /// Participant rows for many expenses in one round trip, keyed by
    /// expense id.
    async fn list_participants_bulk(
        &self,
        expense_ids: &[String],
    ) -> Result<HashMap<String, Vec<ExpenseParticipant>>, TallyError>;
    async fn get_participant_share(&self, expense_id: &str, user_id: &str) -> Result<Option<Money>, TallyError>;

    async fn save_settlement(&self, settlement: Settlement) -> Result<(), TallyError>;
    async fn get_settlement(&self, settlement_id: &str) -> Result<Option<Settlement>, TallyError>;
    async fn list_settlements_involving(
        &self,
        user_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<Settlement>, TallyError>;

    async fn save_activity(&self, activity: Activity) -> Result<(), TallyError>;
    /// Feed page for a user: with a group filter, that group's entries; with
    /// none, entries from the user's groups, ungrouped entries, and the
    /// user's own. Newest first.
    async fn list_activities(
        &self,
        user_id: &str,
        group_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Activity>, TallyError>;
}

pub mod in_memory;
