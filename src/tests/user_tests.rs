use crate::core::errors::TallyError;
use crate::core::services::NewUser;
use crate::tests::{seed_user, test_ctx};

fn new_user(name: &str, email: &str) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password: "hunter22".to_string(),
        pubkey: format!("{}-pubkey", name.to_lowercase()),
        avatar: None,
    }
}

#[tokio::test]
async fn register_then_authenticate_round_trip() {
    let ctx = test_ctx();
    let user = ctx.service.register_user(new_user("Alice", "alice@example.com")).await.unwrap();
    assert_eq!(user.name, "Alice");

    let token = ctx.service.authenticate("alice@example.com", "hunter22").await.unwrap();
    let claims = ctx.service.validate_token(&token).unwrap();
    assert_eq!(claims.sub, user.id);
}

#[tokio::test]
async fn wrong_password_is_rejected() {
    let ctx = test_ctx();
    ctx.service.register_user(new_user("Alice", "alice@example.com")).await.unwrap();

    let result = ctx.service.authenticate("alice@example.com", "wrong").await;
    assert!(matches!(result, Err(TallyError::InvalidCredentials)));

    let result = ctx.service.authenticate("nobody@example.com", "hunter22").await;
    assert!(matches!(result, Err(TallyError::InvalidCredentials)));
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let ctx = test_ctx();
    ctx.service.register_user(new_user("Alice", "alice@example.com")).await.unwrap();

    let result = ctx.service.register_user(new_user("Alicia", "alice@example.com")).await;
    assert!(matches!(result, Err(TallyError::EmailAlreadyRegistered(_))));
}

#[tokio::test]
async fn registration_validates_fields() {
    let ctx = test_ctx();

    let mut input = new_user("Alice", "alice@example.com");
    input.name = "".to_string();
    assert!(matches!(
        ctx.service.register_user(input).await,
        Err(TallyError::MissingField(f)) if f == "name"
    ));

    let input = new_user("Alice", "not-an-email");
    assert!(matches!(
        ctx.service.register_user(input).await,
        Err(TallyError::MissingField(f)) if f == "email"
    ));
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let ctx = test_ctx();
    ctx.service.register_user(new_user("Alice", "alice@example.com")).await.unwrap();
    let token = ctx.service.authenticate("alice@example.com", "hunter22").await.unwrap();

    let mut tampered = token.clone();
    tampered.push('x');
    assert!(matches!(
        ctx.service.validate_token(&tampered),
        Err(TallyError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn create_group_always_includes_creator() {
    let ctx = test_ctx();
    for id in ["ua", "ub"] {
        seed_user(&ctx.storage, id, id).await;
    }

    let group = ctx
        .service
        .create_group("Trip".to_string(), vec!["ub".to_string()], false, "ua")
        .await
        .unwrap();
    assert!(group.has_member("ua"));
    assert!(group.has_member("ub"));
    assert!(!group.simplify_debts);

    let fetched = ctx.service.get_group(&group.id).await.unwrap().unwrap();
    assert_eq!(fetched.member_ids, group.member_ids);
}

#[tokio::test]
async fn create_group_rejects_unknown_member() {
    let ctx = test_ctx();
    seed_user(&ctx.storage, "ua", "Alice").await;

    let result = ctx
        .service
        .create_group("Trip".to_string(), vec!["ghost".to_string()], false, "ua")
        .await;
    assert!(matches!(result, Err(TallyError::UserNotFound(id)) if id == "ghost"));
}
