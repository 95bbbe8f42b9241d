mod expense_tests;
mod user_tests;

use crate::core::models::user::User;
use crate::core::services::TallyService;
use crate::infrastructure::logging::in_memory::InMemoryLogging;
use crate::infrastructure::storage::LedgerStore;
use crate::infrastructure::storage::in_memory::InMemoryStorage;
use chrono::Utc;

pub struct TestCtx {
    pub service: TallyService<InMemoryLogging, InMemoryStorage>,
    // Shares state with the service; lets tests seed and inspect the ledger
    // directly.
    pub storage: InMemoryStorage,
}

pub fn test_ctx() -> TestCtx {
    let storage = InMemoryStorage::new();
    let service = TallyService::new(storage.clone(), InMemoryLogging::new(), "test-secret".to_string());
    TestCtx { service, storage }
}

/// Seeds a user straight into storage with a fixed id, skipping the bcrypt
/// round the registration path takes.
pub async fn seed_user(storage: &InMemoryStorage, id: &str, name: &str) -> User {
    storage
        .create_user(User {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", id),
            password: "not-a-real-hash".to_string(),
            pubkey: format!("{}-pubkey", id),
            avatar: None,
            created_at: Utc::now(),
        })
        .await
        .unwrap()
}
