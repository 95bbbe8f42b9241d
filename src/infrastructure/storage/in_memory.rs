use crate::core::errors::TallyError;
use crate::core::models::{
    activity::Activity,
    expense::{Expense, ExpenseParticipant},
    group::Group,
    money::Money,
    settlement::Settlement,
    user::{User, UserSummary},
};
use crate::infrastructure::storage::LedgerStore;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    users: Arc<RwLock<HashMap<String, User>>>,
    users_by_email: Arc<RwLock<HashMap<String, String>>>,
    groups: Arc<RwLock<HashMap<String, Group>>>,
    expenses: Arc<RwLock<HashMap<String, Expense>>>,
    participants: Arc<RwLock<HashMap<String, Vec<ExpenseParticipant>>>>,
    settlements: Arc<RwLock<HashMap<String, Settlement>>>,
    activities: Arc<RwLock<Vec<Activity>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, TallyError> {
        let mut users_by_email = self.users_by_email.write().await;
        if users_by_email.contains_key(&user.email) {
            return Err(TallyError::EmailAlreadyRegistered(user.email));
        }
        users_by_email.insert(user.email.clone(), user.id.clone());
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, TallyError> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, TallyError> {
        let users_by_email = self.users_by_email.read().await;
        let users = self.users.read().await;
        Ok(users_by_email.get(email).and_then(|id| users.get(id).cloned()))
    }

    async fn get_users(&self, user_ids: &[String]) -> Result<HashMap<String, UserSummary>, TallyError> {
        let users = self.users.read().await;
        Ok(user_ids
            .iter()
            .filter_map(|id| users.get(id).map(|u| (id.clone(), u.summary())))
            .collect())
    }

    async fn save_group(&self, group: Group) -> Result<(), TallyError> {
        let mut groups = self.groups.write().await;
        groups.insert(group.id.clone(), group);
        Ok(())
    }

    async fn get_group(&self, group_id: &str) -> Result<Option<Group>, TallyError> {
        let groups = self.groups.read().await;
        Ok(groups.get(group_id).cloned())
    }

    async fn get_user_groups(&self, user_id: &str) -> Result<Vec<Group>, TallyError> {
        let groups = self.groups.read().await;
        Ok(groups.values().filter(|g| g.has_member(user_id)).cloned().collect())
    }

    async fn save_expense(&self, expense: Expense) -> Result<(), TallyError> {
        let mut expenses = self.expenses.write().await;
        expenses.insert(expense.id.clone(), expense);
        Ok(())
    }

    async fn get_expense(&self, expense_id: &str) -> Result<Option<Expense>, TallyError> {
        let expenses = self.expenses.read().await;
        Ok(expenses.get(expense_id).cloned())
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<(), TallyError> {
        let mut expenses = self.expenses.write().await;
        expenses.remove(expense_id);
        let mut participants = self.participants.write().await;
        participants.remove(expense_id);
        Ok(())
    }

    async fn list_expenses_involving(&self, user_id: &str, group_id: Option<&str>) -> Result<Vec<Expense>, TallyError> {
        let expenses = self.expenses.read().await;
        let participants = self.participants.read().await;
        let participating: HashSet<&str> = participants
            .iter()
            .filter(|(_, rows)| rows.iter().any(|r| r.user_id == user_id))
            .map(|(expense_id, _)| expense_id.as_str())
            .collect();

        let mut involved: Vec<Expense> = expenses
            .values()
            .filter(|e| e.paid_by == user_id || participating.contains(e.id.as_str()))
            .filter(|e| group_id.is_none_or(|g| e.group_id.as_deref() == Some(g)))
            .cloned()
            .collect();
        involved.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
        Ok(involved)
    }

    async fn replace_participants(
        &self,
        expense_id: &str,
        rows: Vec<ExpenseParticipant>,
    ) -> Result<(), TallyError> {
        let mut participants = self.participants.write().await;
        participants.insert(expense_id.to_string(), rows);
        Ok(())
    }

    async fn list_participants(&self, expense_id: &str) -> Result<Vec<ExpenseParticipant>, TallyError> {
        let participants = self.participants.read().await;
        Ok(participants.get(expense_id).cloned().unwrap_or_default())
    }

    async fn list_participants_bulk(
        &self,
        expense_ids: &[String],
    ) -> Result<HashMap<String, Vec<ExpenseParticipant>>, TallyError> {
        let participants = self.participants.read().await;
        Ok(expense_ids
            .iter()
            .filter_map(|id| participants.get(id).map(|rows| (id.clone(), rows.clone())))
            .collect())
    }

    async fn get_participant_share(&self, expense_id: &str, user_id: &str) -> Result<Option<Money>, TallyError> {
        let participants = self.participants.read().await;
        Ok(participants
            .get(expense_id)
            .and_then(|rows| rows.iter().find(|r| r.user_id == user_id))
            .map(|r| r.share))
    }

    async fn save_settlement(&self, settlement: Settlement) -> Result<(), TallyError> {
        let mut settlements = self.settlements.write().await;
        settlements.insert(settlement.id.clone(), settlement);
        Ok(())
    }

    async fn get_settlement(&self, settlement_id: &str) -> Result<Option<Settlement>, TallyError> {
        let settlements = self.settlements.read().await;
        Ok(settlements.get(settlement_id).cloned())
    }

    async fn list_settlements_involving(
        &self,
        user_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<Settlement>, TallyError> {
        let settlements = self.settlements.read().await;
        Ok(settlements
            .values()
            .filter(|s| s.from_user_id == user_id || s.to_user_id == user_id)
            .filter(|s| group_id.is_none_or(|g| s.group_id.as_deref() == Some(g)))
            .cloned()
            .collect())
    }

    async fn save_activity(&self, activity: Activity) -> Result<(), TallyError> {
        let mut activities = self.activities.write().await;
        activities.push(activity);
        Ok(())
    }

    async fn list_activities(
        &self,
        user_id: &str,
        group_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Activity>, TallyError> {
        let member_of: HashSet<String> = self
            .get_user_groups(user_id)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect();

        let activities = self.activities.read().await;
        let mut page: Vec<Activity> = activities
            .iter()
            .filter(|a| match group_id {
                Some(g) => a.group_id.as_deref() == Some(g),
                None => {
                    a.group_id.as_ref().is_none_or(|g| member_of.contains(g)) || a.user_id == user_id
                }
            })
            .cloned()
            .collect();
        page.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page.into_iter().skip(offset).take(limit).collect())
    }
}
