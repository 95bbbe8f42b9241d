// Action names recorded in the application log.
pub const USER_REGISTERED: &str = "user_registered";
pub const GROUP_CREATED: &str = "group_created";
pub const EXPENSE_ADDED: &str = "expense_added";
pub const EXPENSE_EDITED: &str = "expense_edited";
pub const EXPENSE_DELETED: &str = "expense_deleted";
pub const SPLIT_ADJUSTED: &str = "split_adjusted";
pub const SETTLEMENT_RECORDED: &str = "settlement_recorded";
pub const BALANCES_QUERIED: &str = "balances_queried";
pub const EXPENSES_QUERIED: &str = "expenses_queried";
pub const ACTIVITIES_QUERIED: &str = "activities_queried";
