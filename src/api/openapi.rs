use utoipa::OpenApi;

use crate::{
    api::models::{ActivitiesQuery, BalancesQuery, CreateGroupRequest, ErrorResponse, LoginRequest, LoginResponse},
    core::{
        models::{
            activity::{Activity, ActivityDetail, ActivityKind},
            balance::{BalanceEntry, Direction},
            expense::{Expense, ExpenseDetail, ExpenseParticipant, SplitType},
            group::Group,
            log::AppLog,
            settlement::Settlement,
            user::{User, UserSummary},
        },
        services::{
            AdjustedShare, ExpenseUpdate, NewExpense, NewSettlement, NewUser, ParticipantShare, SplitAdjustment,
        },
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::login,
        super::handlers::register_user,
        super::handlers::get_user,
        super::handlers::create_group,
        super::handlers::get_group,
        super::handlers::get_balances,
        super::handlers::record_settlement,
        super::handlers::create_expense,
        super::handlers::list_expenses,
        super::handlers::get_expense,
        super::handlers::update_expense,
        super::handlers::delete_expense,
        super::handlers::adjust_split,
        super::handlers::list_activities,
        super::handlers::get_app_logs
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        CreateGroupRequest,
        BalancesQuery,
        ActivitiesQuery,
        NewUser,
        NewExpense,
        ExpenseUpdate,
        ParticipantShare,
        AdjustedShare,
        SplitAdjustment,
        NewSettlement,
        ErrorResponse,
        User,
        UserSummary,
        Group,
        Expense,
        ExpenseDetail,
        ExpenseParticipant,
        SplitType,
        Settlement,
        BalanceEntry,
        Direction,
        Activity,
        ActivityDetail,
        ActivityKind,
        AppLog
    )),
    info(
        title = "Tally API",
        description = "Shared-expense ledger: expenses, settlements, and on-demand pairwise balances",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
