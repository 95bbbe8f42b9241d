use crate::core::errors::TallyError;
use crate::core::models::balance::{BalanceEntry, Direction};
use crate::core::models::money::Money;
use crate::infrastructure::storage::LedgerStore;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Computes net pairwise balances for one subject over a point-in-time read
/// of the ledger store. Stateless: every call rebuilds the accumulator from
/// scratch, nothing is written back.
///
/// The reads are issued as independent queries without a transaction wrapper,
/// so a writer landing mid-computation can skew one result. Callers simply
/// recompute; nothing downstream depends on a stale view.
pub struct BalanceEngine<'a, S: LedgerStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: LedgerStore + ?Sized> BalanceEngine<'a, S> {
    pub fn new(store: &'a S) -> Self {
        BalanceEngine { store }
    }

    /// Runs the four stages: expense contributions, settlement adjustments,
    /// netting with the one-cent threshold, then materialization with
    /// counterpart display data.
    pub async fn compute(&self, subject: &str, group_id: Option<&str>) -> Result<Vec<BalanceEntry>, TallyError> {
        let mut ledger = self.resolve_expense_contributions(subject, group_id).await?;
        self.apply_settlements(subject, group_id, &mut ledger).await?;
        let net = Self::net_and_threshold(ledger);
        self.materialize(subject, net).await
    }

    /// Folds every expense involving the subject into a per-counterpart
    /// signed accumulator. Positive means the counterpart owes the subject.
    async fn resolve_expense_contributions(
        &self,
        subject: &str,
        group_id: Option<&str>,
    ) -> Result<HashMap<String, Money>, TallyError> {
        let expenses = self.store.list_expenses_involving(subject, group_id).await?;
        let expense_ids: Vec<String> = expenses.iter().map(|e| e.id.clone()).collect();
        let participants = self.store.list_participants_bulk(&expense_ids).await?;

        let mut ledger: HashMap<String, Money> = HashMap::new();
        let mut processed: HashSet<&str> = HashSet::new();

        for expense in &expenses {
            // An expense reaching the subject through both the payer role and
            // a self-participant row must still count once.
            if !processed.insert(expense.id.as_str()) {
                continue;
            }

            let rows = participants.get(&expense.id).map(Vec::as_slice).unwrap_or(&[]);

            if expense.paid_by == subject {
                // Subject paid: every other participant owes their share.
                for row in rows.iter().filter(|r| r.user_id != subject) {
                    *ledger.entry(row.user_id.clone()).or_insert(Money::ZERO) += row.share;
                }
            } else if let Some(row) = rows.iter().find(|r| r.user_id == subject) {
                // Subject owes the payer their own share. An expense with no
                // row for the subject contributes nothing.
                *ledger.entry(expense.paid_by.clone()).or_insert(Money::ZERO) -= row.share;
            }
        }

        debug!(subject, entries = ledger.len(), "resolved expense contributions");
        Ok(ledger)
    }

    /// Folds recorded payments into the same accumulator. A payment the
    /// subject made raises their position against the recipient; one they
    /// received lowers it against the sender.
    async fn apply_settlements(
        &self,
        subject: &str,
        group_id: Option<&str>,
        ledger: &mut HashMap<String, Money>,
    ) -> Result<(), TallyError> {
        for settlement in self.store.list_settlements_involving(subject, group_id).await? {
            if settlement.from_user_id == subject {
                *ledger.entry(settlement.to_user_id.clone()).or_insert(Money::ZERO) += settlement.amount;
            } else if settlement.to_user_id == subject {
                *ledger.entry(settlement.from_user_id.clone()).or_insert(Money::ZERO) -= settlement.amount;
            }
        }
        Ok(())
    }

    /// Drops counterparts whose net position is below one cent and fixes an
    /// output order. The contract leaves ordering open; sorting by
    /// counterpart id makes repeated calls byte-identical.
    fn net_and_threshold(ledger: HashMap<String, Money>) -> Vec<(String, Money)> {
        let mut net: Vec<(String, Money)> = ledger.into_iter().filter(|(_, amount)| !amount.is_negligible()).collect();
        net.sort_by(|a, b| a.0.cmp(&b.0));
        net
    }

    /// Turns each signed net amount into a user-facing entry. Counterpart
    /// display data is fetched in one batch; a counterpart the store no
    /// longer knows is dropped rather than failing the whole computation.
    async fn materialize(&self, subject: &str, net: Vec<(String, Money)>) -> Result<Vec<BalanceEntry>, TallyError> {
        let counterpart_ids: Vec<String> = net.iter().map(|(id, _)| id.clone()).collect();
        let users = self.store.get_users(&counterpart_ids).await?;

        let mut entries = Vec::with_capacity(net.len());
        for (counterpart, amount) in net {
            let Some(user) = users.get(&counterpart) else {
                debug!(subject, counterpart, "skipping balance with unresolvable counterpart");
                continue;
            };
            entries.push(BalanceEntry {
                id: format!("balance_{}_{}", subject, counterpart),
                user_id: counterpart,
                user_name: user.name.clone(),
                user_pubkey: user.pubkey.clone(),
                user_avatar: user.avatar.clone(),
                amount: amount.abs(),
                direction: if amount.is_positive() {
                    Direction::GetsBack
                } else {
                    Direction::Owes
                },
            });
        }
        Ok(entries)
    }
}
