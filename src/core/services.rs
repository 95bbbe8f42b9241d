use crate::auth::jwt::{Claims, JwtService};
use crate::constants::{
    ACTIVITIES_QUERIED, BALANCES_QUERIED, EXPENSE_ADDED, EXPENSE_DELETED, EXPENSE_EDITED, EXPENSES_QUERIED,
    GROUP_CREATED, SETTLEMENT_RECORDED, SPLIT_ADJUSTED, USER_REGISTERED,
};
use crate::core::engine::BalanceEngine;
use crate::core::errors::TallyError;
use crate::core::models::{
    activity::{Activity, ActivityDetail, ActivityKind},
    balance::BalanceEntry,
    expense::{Expense, ExpenseDetail, ExpenseParticipant, SplitType},
    group::Group,
    log::AppLog,
    money::Money,
    settlement::Settlement,
    user::User,
};
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::LedgerStore;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub pubkey: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantShare {
    pub user_id: String,
    #[schema(value_type = Option<f64>)]
    pub share: Option<Money>,
    #[schema(value_type = Option<f64>)]
    pub paid_share: Option<Money>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub description: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    pub paid_by: Option<String>,
    pub split_type: Option<SplitType>,
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub group_id: Option<String>,
    #[serde(default)]
    pub participants: Vec<ParticipantShare>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub amount: Option<Money>,
    pub paid_by: Option<String>,
    pub split_type: Option<SplitType>,
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustedShare {
    pub user_id: String,
    #[schema(value_type = f64)]
    pub share: Money,
    #[schema(value_type = Option<f64>)]
    pub paid_share: Option<Money>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SplitAdjustment {
    pub split_type: Option<SplitType>,
    #[serde(default)]
    pub participants: Vec<AdjustedShare>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewSettlement {
    pub from_user_id: String,
    pub to_user_id: String,
    #[schema(value_type = f64)]
    pub amount: Money,
    pub group_id: Option<String>,
    #[schema(value_type = Option<String>)]
    pub date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub transaction_reference: Option<String>,
}

pub struct TallyService<L: LoggingService, S: LedgerStore> {
    storage: S,
    logging: L,
    jwt_service: JwtService,
}

impl<L: LoggingService, S: LedgerStore> TallyService<L, S> {
    pub fn new(storage: S, logging: L, jwt_secret: String) -> Self {
        TallyService {
            storage,
            logging,
            jwt_service: JwtService::new(jwt_secret),
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, TallyError> {
        self.jwt_service.validate_token(token)
    }

    async fn validate_users(&self, user_ids: &[&str]) -> Result<(), TallyError> {
        for &user_id in user_ids {
            if self.storage.get_user(user_id).await?.is_none() {
                return Err(TallyError::UserNotFound(user_id.to_string()));
            }
        }
        Ok(())
    }

    fn require(field: &str, value: &str) -> Result<(), TallyError> {
        if value.trim().is_empty() {
            return Err(TallyError::MissingField(field.to_string()));
        }
        Ok(())
    }

    fn require_positive(amount: Money) -> Result<(), TallyError> {
        if !amount.is_positive() {
            return Err(TallyError::InvalidAmount);
        }
        Ok(())
    }

    // USERS

    pub async fn register_user(&self, new_user: NewUser) -> Result<User, TallyError> {
        Self::require("name", &new_user.name)?;
        Self::require("pubkey", &new_user.pubkey)?;
        Self::require("password", &new_user.password)?;
        if !new_user.email.contains('@') || !new_user.email.contains('.') || new_user.email.len() < 5 {
            return Err(TallyError::MissingField("email".to_string()));
        }

        let password = bcrypt::hash(&new_user.password, bcrypt::DEFAULT_COST)
            .map_err(|e| TallyError::InternalServerError(format!("Password hashing error: {}", e)))?;
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            password,
            pubkey: new_user.pubkey,
            avatar: new_user.avatar,
            created_at: Utc::now(),
        };

        let created = self.storage.create_user(user).await?;
        self.logging
            .log_action(
                USER_REGISTERED,
                json!({ "user_id": created.id, "name": created.name }),
                Some(&created.id),
            )
            .await?;
        Ok(created)
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, TallyError> {
        let user = self
            .storage
            .get_user_by_email(email)
            .await?
            .ok_or(TallyError::InvalidCredentials)?;

        if bcrypt::verify(password, &user.password)
            .map_err(|e| TallyError::InternalServerError(format!("Password verification error: {}", e)))?
        {
            self.jwt_service.generate_token(&user.id)
        } else {
            Err(TallyError::InvalidCredentials)
        }
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, TallyError> {
        self.storage.get_user(user_id).await
    }

    // GROUPS

    pub async fn create_group(
        &self,
        name: String,
        member_ids: Vec<String>,
        simplify_debts: bool,
        created_by: &str,
    ) -> Result<Group, TallyError> {
        Self::require("name", &name)?;
        let mut member_ids = member_ids;
        if !member_ids.iter().any(|m| m == created_by) {
            member_ids.push(created_by.to_string());
        }
        self.validate_users(&member_ids.iter().map(String::as_str).collect::<Vec<_>>())
            .await?;

        let group = Group {
            id: Uuid::new_v4().to_string(),
            name,
            created_by: created_by.to_string(),
            member_ids,
            // Stored for forward compatibility; nothing reads it yet.
            simplify_debts,
            created_at: Utc::now(),
        };
        self.storage.save_group(group.clone()).await?;

        self.logging
            .log_action(
                GROUP_CREATED,
                json!({ "group_id": group.id, "name": group.name, "member_ids": group.member_ids }),
                Some(created_by),
            )
            .await?;
        Ok(group)
    }

    pub async fn get_group(&self, group_id: &str) -> Result<Option<Group>, TallyError> {
        self.storage.get_group(group_id).await
    }

    // BALANCES

    /// Recomputes the subject's pairwise net balances from a fresh ledger
    /// read. Nothing is cached or persisted between calls.
    pub async fn compute_balances(
        &self,
        subject_user_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<BalanceEntry>, TallyError> {
        let balances = BalanceEngine::new(&self.storage)
            .compute(subject_user_id, group_id)
            .await?;

        self.logging
            .log_action(
                BALANCES_QUERIED,
                json!({ "user_id": subject_user_id, "group_id": group_id, "entries": balances.len() }),
                Some(subject_user_id),
            )
            .await?;
        Ok(balances)
    }

    // SETTLEMENTS

    pub async fn record_settlement(
        &self,
        input: NewSettlement,
        recorded_by: &str,
    ) -> Result<Settlement, TallyError> {
        Self::require("from_user_id", &input.from_user_id)?;
        Self::require("to_user_id", &input.to_user_id)?;
        Self::require_positive(input.amount)?;

        let now = Utc::now();
        let settlement = Settlement {
            id: Uuid::new_v4().to_string(),
            group_id: input.group_id,
            from_user_id: input.from_user_id,
            to_user_id: input.to_user_id,
            amount: input.amount,
            date: input.date.unwrap_or(now),
            notes: input.notes,
            transaction_reference: input.transaction_reference,
            created_at: now,
        };
        self.storage.save_settlement(settlement.clone()).await?;
        info!(settlement_id = %settlement.id, amount = %settlement.amount, "settlement recorded");

        // A missing party still gets a feed entry, just with a placeholder name.
        let names = self
            .storage
            .get_users(&[settlement.from_user_id.clone(), settlement.to_user_id.clone()])
            .await?;
        let from_name = names
            .get(&settlement.from_user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "Someone".to_string());
        let to_name = names
            .get(&settlement.to_user_id)
            .map(|u| u.name.clone())
            .unwrap_or_else(|| "someone".to_string());

        self.storage
            .save_activity(Activity {
                id: Uuid::new_v4().to_string(),
                kind: ActivityKind::PaymentMade,
                user_id: recorded_by.to_string(),
                group_id: settlement.group_id.clone(),
                expense_id: None,
                settlement_id: Some(settlement.id.clone()),
                description: format!("{} paid {} ${}", from_name, to_name, settlement.amount),
                amount: settlement.amount,
                created_at: now,
            })
            .await?;

        self.logging
            .log_action(
                SETTLEMENT_RECORDED,
                json!({
                    "settlement_id": settlement.id,
                    "from_user_id": settlement.from_user_id,
                    "to_user_id": settlement.to_user_id,
                    "amount": settlement.amount,
                    "group_id": settlement.group_id
                }),
                Some(recorded_by),
            )
            .await?;

        Ok(settlement)
    }

    // EXPENSES

    pub async fn create_expense(&self, input: NewExpense, created_by: &str) -> Result<Expense, TallyError> {
        Self::require("description", &input.description)?;
        Self::require_positive(input.amount)?;

        let now = Utc::now();
        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            group_id: input.group_id,
            description: input.description,
            amount: input.amount,
            paid_by: input.paid_by.unwrap_or_else(|| created_by.to_string()),
            split_type: input.split_type.unwrap_or_default(),
            date: input.date.unwrap_or(now),
            notes: input.notes,
            category: input.category,
            created_at: now,
            updated_at: now,
        };

        let rows = if input.participants.is_empty() {
            // No explicit split: the payer carries the whole amount.
            vec![ExpenseParticipant {
                expense_id: expense.id.clone(),
                user_id: expense.paid_by.clone(),
                share: expense.amount,
                paid_share: Money::ZERO,
            }]
        } else {
            let even = expense.amount.split_evenly(input.participants.len());
            input
                .participants
                .into_iter()
                .zip(even)
                .map(|(p, default_share)| ExpenseParticipant {
                    expense_id: expense.id.clone(),
                    user_id: p.user_id,
                    share: p.share.unwrap_or(default_share),
                    paid_share: p.paid_share.unwrap_or(Money::ZERO),
                })
                .collect()
        };

        self.storage.save_expense(expense.clone()).await?;
        self.storage.replace_participants(&expense.id, rows).await?;

        self.storage
            .save_activity(Activity {
                id: Uuid::new_v4().to_string(),
                kind: ActivityKind::ExpenseAdded,
                user_id: created_by.to_string(),
                group_id: expense.group_id.clone(),
                expense_id: Some(expense.id.clone()),
                settlement_id: None,
                description: format!("Added expense: {}", expense.description),
                amount: expense.amount,
                created_at: now,
            })
            .await?;

        self.logging
            .log_action(
                EXPENSE_ADDED,
                json!({ "expense_id": expense.id, "group_id": expense.group_id, "amount": expense.amount }),
                Some(created_by),
            )
            .await?;

        Ok(expense)
    }

    pub async fn update_expense(
        &self,
        expense_id: &str,
        update: ExpenseUpdate,
        edited_by: &str,
    ) -> Result<Expense, TallyError> {
        let mut expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| TallyError::ExpenseNotFound(expense_id.to_string()))?;

        if let Some(amount) = update.amount {
            Self::require_positive(amount)?;
            expense.amount = amount;
        }
        if let Some(description) = update.description {
            expense.description = description;
        }
        if let Some(paid_by) = update.paid_by {
            expense.paid_by = paid_by;
        }
        if let Some(split_type) = update.split_type {
            expense.split_type = split_type;
        }
        if let Some(date) = update.date {
            expense.date = date;
        }
        if let Some(notes) = update.notes {
            expense.notes = Some(notes);
        }
        if let Some(category) = update.category {
            expense.category = Some(category);
        }
        expense.updated_at = Utc::now();
        self.storage.save_expense(expense.clone()).await?;

        self.storage
            .save_activity(Activity {
                id: Uuid::new_v4().to_string(),
                kind: ActivityKind::ExpenseEdited,
                user_id: edited_by.to_string(),
                group_id: expense.group_id.clone(),
                expense_id: Some(expense.id.clone()),
                settlement_id: None,
                description: format!("Edited expense: {}", expense.description),
                amount: expense.amount,
                created_at: expense.updated_at,
            })
            .await?;

        self.logging
            .log_action(
                EXPENSE_EDITED,
                json!({ "expense_id": expense.id, "amount": expense.amount }),
                Some(edited_by),
            )
            .await?;

        Ok(expense)
    }

    pub async fn delete_expense(&self, expense_id: &str, deleted_by: &str) -> Result<(), TallyError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| TallyError::ExpenseNotFound(expense_id.to_string()))?;

        // Feed entry is written first so the description survives the delete.
        self.storage
            .save_activity(Activity {
                id: Uuid::new_v4().to_string(),
                kind: ActivityKind::ExpenseDeleted,
                user_id: deleted_by.to_string(),
                group_id: expense.group_id.clone(),
                expense_id: None,
                settlement_id: None,
                description: format!("Deleted expense: {}", expense.description),
                amount: expense.amount,
                created_at: Utc::now(),
            })
            .await?;

        self.storage.delete_expense(expense_id).await?;

        self.logging
            .log_action(EXPENSE_DELETED, json!({ "expense_id": expense_id }), Some(deleted_by))
            .await?;
        Ok(())
    }

    pub async fn adjust_split(
        &self,
        expense_id: &str,
        adjustment: SplitAdjustment,
        adjusted_by: &str,
    ) -> Result<(), TallyError> {
        let mut expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| TallyError::ExpenseNotFound(expense_id.to_string()))?;

        if let Some(split_type) = adjustment.split_type {
            expense.split_type = split_type;
            expense.updated_at = Utc::now();
            self.storage.save_expense(expense.clone()).await?;
        }

        if !adjustment.participants.is_empty() {
            let rows = adjustment
                .participants
                .into_iter()
                .map(|p| ExpenseParticipant {
                    expense_id: expense_id.to_string(),
                    user_id: p.user_id,
                    share: p.share,
                    paid_share: p.paid_share.unwrap_or(Money::ZERO),
                })
                .collect();
            self.storage.replace_participants(expense_id, rows).await?;
        }

        self.logging
            .log_action(SPLIT_ADJUSTED, json!({ "expense_id": expense_id }), Some(adjusted_by))
            .await?;
        Ok(())
    }

    pub async fn get_expense_detail(&self, expense_id: &str) -> Result<ExpenseDetail, TallyError> {
        let expense = self
            .storage
            .get_expense(expense_id)
            .await?
            .ok_or_else(|| TallyError::ExpenseNotFound(expense_id.to_string()))?;
        let payer = self
            .storage
            .get_user(&expense.paid_by)
            .await?
            .ok_or_else(|| TallyError::UserNotFound(expense.paid_by.clone()))?;
        let participants = self.storage.list_participants(expense_id).await?;

        Ok(ExpenseDetail {
            paid_by_name: payer.name,
            paid_by_pubkey: payer.pubkey,
            participants,
            expense,
        })
    }

    pub async fn list_expenses(
        &self,
        subject_user_id: &str,
        group_id: Option<&str>,
    ) -> Result<Vec<ExpenseDetail>, TallyError> {
        let expenses = self.storage.list_expenses_involving(subject_user_id, group_id).await?;
        let expense_ids: Vec<String> = expenses.iter().map(|e| e.id.clone()).collect();
        let mut participants = self.storage.list_participants_bulk(&expense_ids).await?;
        let payer_ids: Vec<String> = expenses.iter().map(|e| e.paid_by.clone()).collect();
        let payers = self.storage.get_users(&payer_ids).await?;

        let details = expenses
            .into_iter()
            .filter_map(|expense| {
                // An expense whose payer record is gone is dropped from the
                // listing, matching inner-join semantics.
                let payer = payers.get(&expense.paid_by)?;
                Some(ExpenseDetail {
                    paid_by_name: payer.name.clone(),
                    paid_by_pubkey: payer.pubkey.clone(),
                    participants: participants.remove(&expense.id).unwrap_or_default(),
                    expense,
                })
            })
            .collect();

        self.logging
            .log_action(
                EXPENSES_QUERIED,
                json!({ "user_id": subject_user_id, "group_id": group_id }),
                Some(subject_user_id),
            )
            .await?;
        Ok(details)
    }

    // ACTIVITY FEED

    pub async fn list_activities(
        &self,
        subject_user_id: &str,
        group_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ActivityDetail>, TallyError> {
        let activities = self
            .storage
            .list_activities(subject_user_id, group_id, limit, offset)
            .await?;

        let actor_ids: Vec<String> = activities.iter().map(|a| a.user_id.clone()).collect();
        let actors = self.storage.get_users(&actor_ids).await?;
        let settlements = try_join_all(activities.iter().map(|a| async {
            match &a.settlement_id {
                Some(id) => self.storage.get_settlement(id).await,
                None => Ok(None),
            }
        }))
        .await?;

        let mut details = Vec::with_capacity(activities.len());
        for (activity, settlement) in activities.into_iter().zip(settlements) {
            // A feed entry whose actor record is gone is dropped, the same way
            // the balance engine drops unresolvable counterparts.
            let Some(actor) = actors.get(&activity.user_id) else {
                continue;
            };
            details.push(ActivityDetail::new(activity, actor, settlement));
        }

        self.logging
            .log_action(
                ACTIVITIES_QUERIED,
                json!({ "user_id": subject_user_id, "group_id": group_id }),
                Some(subject_user_id),
            )
            .await?;
        Ok(details)
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, TallyError> {
        self.logging.get_logs().await
    }
}
