use crate::core::errors::TallyError;
use crate::core::models::expense::SplitType;
use crate::core::models::money::Money;
use crate::core::services::{AdjustedShare, ExpenseUpdate, NewExpense, ParticipantShare, SplitAdjustment};
use crate::infrastructure::storage::LedgerStore;
use crate::tests::{seed_user, test_ctx};

fn base_expense(amount: f64, paid_by: &str) -> NewExpense {
    NewExpense {
        description: "Dinner".to_string(),
        amount: Money::from_f64(amount).unwrap(),
        paid_by: Some(paid_by.to_string()),
        split_type: None,
        date: None,
        notes: None,
        category: None,
        group_id: None,
        participants: Vec::new(),
    }
}

fn participant(user_id: &str) -> ParticipantShare {
    ParticipantShare {
        user_id: user_id.to_string(),
        share: None,
        paid_share: None,
    }
}

#[tokio::test]
async fn expense_without_participants_gets_payer_self_share() {
    let ctx = test_ctx();
    seed_user(&ctx.storage, "ux", "Xena").await;

    let expense = ctx.service.create_expense(base_expense(42.0, "ux"), "ux").await.unwrap();

    let detail = ctx.service.get_expense_detail(&expense.id).await.unwrap();
    assert_eq!(detail.participants.len(), 1);
    assert_eq!(detail.participants[0].user_id, "ux");
    assert_eq!(detail.participants[0].share, Money::from_f64(42.0).unwrap());
    assert_eq!(detail.paid_by_name, "Xena");
}

#[tokio::test]
async fn equal_split_distributes_remainder_cents() {
    let ctx = test_ctx();
    for id in ["ux", "uy", "uz"] {
        seed_user(&ctx.storage, id, id).await;
    }

    let mut input = base_expense(10.0, "ux");
    input.participants = vec![participant("ux"), participant("uy"), participant("uz")];
    let expense = ctx.service.create_expense(input, "ux").await.unwrap();

    let rows = ctx.storage.list_participants(&expense.id).await.unwrap();
    let total: Money = rows.iter().map(|r| r.share).sum();
    assert_eq!(total, Money::from_major(10));
    assert_eq!(rows[0].share, Money::from_cents(334));
    assert_eq!(rows[1].share, Money::from_cents(333));

    // The single-row lookup agrees with the bulk one.
    let share = ctx.storage.get_participant_share(&expense.id, "uy").await.unwrap();
    assert_eq!(share, Some(Money::from_cents(333)));
}

#[tokio::test]
async fn create_expense_rejects_bad_input() {
    let ctx = test_ctx();
    seed_user(&ctx.storage, "ux", "Xena").await;

    let mut input = base_expense(10.0, "ux");
    input.description = "  ".to_string();
    assert!(matches!(
        ctx.service.create_expense(input, "ux").await,
        Err(TallyError::MissingField(_))
    ));

    let mut input = base_expense(10.0, "ux");
    input.amount = Money::ZERO;
    assert!(matches!(
        ctx.service.create_expense(input, "ux").await,
        Err(TallyError::InvalidAmount)
    ));
}

#[tokio::test]
async fn update_expense_merges_provided_fields() {
    let ctx = test_ctx();
    seed_user(&ctx.storage, "ux", "Xena").await;
    let expense = ctx.service.create_expense(base_expense(42.0, "ux"), "ux").await.unwrap();

    let updated = ctx
        .service
        .update_expense(
            &expense.id,
            ExpenseUpdate {
                description: Some("Dinner and drinks".to_string()),
                amount: Some(Money::from_major(55)),
                notes: Some("tip included".to_string()),
                ..Default::default()
            },
            "ux",
        )
        .await
        .unwrap();

    assert_eq!(updated.description, "Dinner and drinks");
    assert_eq!(updated.amount, Money::from_major(55));
    assert_eq!(updated.notes.as_deref(), Some("tip included"));
    // Untouched fields survive.
    assert_eq!(updated.paid_by, "ux");
    assert_eq!(updated.split_type, SplitType::Equally);
}

#[tokio::test]
async fn update_missing_expense_is_not_found() {
    let ctx = test_ctx();
    seed_user(&ctx.storage, "ux", "Xena").await;
    let result = ctx
        .service
        .update_expense("nope", ExpenseUpdate::default(), "ux")
        .await;
    assert!(matches!(result, Err(TallyError::ExpenseNotFound(_))));
}

#[tokio::test]
async fn delete_expense_clears_ledger_and_leaves_feed_entry() {
    let ctx = test_ctx();
    for id in ["ux", "uy"] {
        seed_user(&ctx.storage, id, id).await;
    }
    let mut input = base_expense(20.0, "ux");
    input.participants = vec![ParticipantShare {
        user_id: "uy".to_string(),
        share: Some(Money::from_major(20)),
        paid_share: None,
    }];
    let expense = ctx.service.create_expense(input, "ux").await.unwrap();

    ctx.service.delete_expense(&expense.id, "ux").await.unwrap();

    assert!(ctx.storage.get_expense(&expense.id).await.unwrap().is_none());
    assert!(ctx.service.compute_balances("ux", None).await.unwrap().is_empty());

    let feed = ctx.service.list_activities("ux", None, 50, 0).await.unwrap();
    assert!(feed.iter().any(|a| a.activity.description == "Deleted expense: Dinner"));
}

#[tokio::test]
async fn adjust_split_replaces_participants() {
    let ctx = test_ctx();
    for id in ["ux", "uy", "uz"] {
        seed_user(&ctx.storage, id, id).await;
    }
    let mut input = base_expense(100.0, "ux");
    input.participants = vec![participant("uy"), participant("uz")];
    let expense = ctx.service.create_expense(input, "ux").await.unwrap();

    ctx.service
        .adjust_split(
            &expense.id,
            SplitAdjustment {
                split_type: Some(SplitType::Unequally),
                participants: vec![
                    AdjustedShare {
                        user_id: "uy".to_string(),
                        share: Money::from_major(70),
                        paid_share: None,
                    },
                    AdjustedShare {
                        user_id: "uz".to_string(),
                        share: Money::from_major(30),
                        paid_share: None,
                    },
                ],
            },
            "ux",
        )
        .await
        .unwrap();

    let detail = ctx.service.get_expense_detail(&expense.id).await.unwrap();
    assert_eq!(detail.expense.split_type, SplitType::Unequally);

    let balances = ctx.service.compute_balances("ux", None).await.unwrap();
    assert_eq!(balances[0].amount, Money::from_major(70));
    assert_eq!(balances[1].amount, Money::from_major(30));
}

#[tokio::test]
async fn list_expenses_is_scoped_and_newest_first() {
    let ctx = test_ctx();
    for id in ["ux", "uy"] {
        seed_user(&ctx.storage, id, id).await;
    }

    let mut grouped = base_expense(10.0, "ux");
    grouped.group_id = Some("g1".to_string());
    grouped.description = "Grouped".to_string();
    ctx.service.create_expense(grouped, "ux").await.unwrap();

    let mut ungrouped = base_expense(5.0, "ux");
    ungrouped.description = "Ungrouped".to_string();
    ctx.service.create_expense(ungrouped, "ux").await.unwrap();

    let all = ctx.service.list_expenses("ux", None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].expense.description, "Ungrouped");

    let only_g1 = ctx.service.list_expenses("ux", Some("g1")).await.unwrap();
    assert_eq!(only_g1.len(), 1);
    assert_eq!(only_g1[0].expense.description, "Grouped");

    // uy has no involvement in either expense.
    assert!(ctx.service.list_expenses("uy", None).await.unwrap().is_empty());
}
