use crate::{
    api::models::*,
    core::{
        errors::TallyError,
        models::{
            activity::ActivityDetail,
            balance::BalanceEntry,
            expense::{Expense, ExpenseDetail},
            group::Group,
            log::AppLog,
            settlement::Settlement,
            user::User,
        },
        services::{ExpenseUpdate, NewExpense, NewSettlement, NewUser, SplitAdjustment, TallyService},
    },
    infrastructure::{logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
};
use http::header;

use crate::auth::jwt::Claims;
use std::sync::Arc;

type Service = Arc<TallyService<InMemoryLogging, InMemoryStorage>>;

// Middleware to validate JWT and attach the caller's claims
async fn auth_middleware(
    State(service): State<Service>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| TallyError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| TallyError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: Service) -> Router {
    let protected_routes = Router::new()
        .route("/users/{user_id}", axum::routing::get(get_user))
        .route("/groups", axum::routing::post(create_group))
        .route("/groups/{group_id}", axum::routing::get(get_group))
        .route("/balances", axum::routing::get(get_balances))
        .route("/settlements", axum::routing::post(record_settlement))
        .route("/expenses", axum::routing::post(create_expense))
        .route("/expenses", axum::routing::get(list_expenses))
        .route("/expenses/{expense_id}", axum::routing::get(get_expense))
        .route("/expenses/{expense_id}", axum::routing::put(update_expense))
        .route("/expenses/{expense_id}", axum::routing::delete(delete_expense))
        .route("/expenses/{expense_id}/split", axum::routing::put(adjust_split))
        .route("/activities", axum::routing::get(list_activities))
        .route("/logs", axum::routing::get(get_app_logs))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/login", axum::routing::post(login))
        .route("/users", axum::routing::post(register_user)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn login(State(service): State<Service>, Json(req): Json<LoginRequest>) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.authenticate(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
async fn register_user(
    State(service): State<Service>,
    Json(req): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = service.register_user(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(("user_id" = String, Path, description = "ID of the user to retrieve")),
    responses(
        (status = 200, description = "User retrieved", body = User),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_user(State(service): State<Service>, Path(user_id): Path<String>) -> Result<Json<User>, ApiError> {
    let user = service
        .get_user(&user_id)
        .await?
        .ok_or_else(|| TallyError::UserNotFound(user_id))?;
    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/api/groups",
    request_body = CreateGroupRequest,
    responses(
        (status = 200, description = "Group created", body = Group),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 404, description = "Member not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn create_group(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<Group>, ApiError> {
    let group = service
        .create_group(req.name, req.member_ids, req.simplify_debts, &claims.sub)
        .await?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/groups/{group_id}",
    params(("group_id" = String, Path, description = "ID of the group to retrieve")),
    responses(
        (status = 200, description = "Group retrieved", body = Group),
        (status = 404, description = "Group not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_group(State(service): State<Service>, Path(group_id): Path<String>) -> Result<Json<Group>, ApiError> {
    let group = service
        .get_group(&group_id)
        .await?
        .ok_or_else(|| TallyError::GroupNotFound(group_id))?;
    Ok(Json(group))
}

#[utoipa::path(
    get,
    path = "/api/balances",
    params(("groupId" = Option<String>, Query, description = "Restrict to one group scope")),
    responses(
        (status = 200, description = "Net pairwise balances for the caller", body = [BalanceEntry]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_balances(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BalancesQuery>,
) -> Result<Json<Vec<BalanceEntry>>, ApiError> {
    let balances = service
        .compute_balances(&claims.sub, query.group_id.as_deref())
        .await?;
    Ok(Json(balances))
}

#[utoipa::path(
    post,
    path = "/api/settlements",
    request_body = NewSettlement,
    responses(
        (status = 201, description = "Settlement recorded", body = Settlement),
        (status = 400, description = "Missing party or non-positive amount", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn record_settlement(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewSettlement>,
) -> Result<(StatusCode, Json<Settlement>), ApiError> {
    let settlement = service.record_settlement(req, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(settlement)))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = NewExpense,
    responses(
        (status = 201, description = "Expense created", body = Expense),
        (status = 400, description = "Bad request", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn create_expense(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    let expense = service.create_expense(req, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[utoipa::path(
    get,
    path = "/api/expenses",
    params(("groupId" = Option<String>, Query, description = "Restrict to one group scope")),
    responses(
        (status = 200, description = "Expenses involving the caller", body = [ExpenseDetail])
    ),
    security(("Bearer" = []))
)]
async fn list_expenses(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<BalancesQuery>,
) -> Result<Json<Vec<ExpenseDetail>>, ApiError> {
    let expenses = service.list_expenses(&claims.sub, query.group_id.as_deref()).await?;
    Ok(Json(expenses))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = String, Path, description = "ID of the expense")),
    responses(
        (status = 200, description = "Expense with participants", body = ExpenseDetail),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn get_expense(
    State(service): State<Service>,
    Path(expense_id): Path<String>,
) -> Result<Json<ExpenseDetail>, ApiError> {
    let detail = service.get_expense_detail(&expense_id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{expense_id}",
    request_body = ExpenseUpdate,
    params(("expense_id" = String, Path, description = "ID of the expense")),
    responses(
        (status = 200, description = "Expense updated", body = Expense),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn update_expense(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<String>,
    Json(req): Json<ExpenseUpdate>,
) -> Result<Json<Expense>, ApiError> {
    let expense = service.update_expense(&expense_id, req, &claims.sub).await?;
    Ok(Json(expense))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{expense_id}",
    params(("expense_id" = String, Path, description = "ID of the expense")),
    responses(
        (status = 200, description = "Expense deleted"),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn delete_expense(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_expense(&expense_id, &claims.sub).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    put,
    path = "/api/expenses/{expense_id}/split",
    request_body = SplitAdjustment,
    params(("expense_id" = String, Path, description = "ID of the expense")),
    responses(
        (status = 200, description = "Split adjusted"),
        (status = 404, description = "Expense not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
async fn adjust_split(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Path(expense_id): Path<String>,
    Json(req): Json<SplitAdjustment>,
) -> Result<StatusCode, ApiError> {
    service.adjust_split(&expense_id, req, &claims.sub).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/api/activities",
    params(
        ("groupId" = Option<String>, Query, description = "Restrict to one group scope"),
        ("limit" = Option<usize>, Query, description = "Page size, default 50"),
        ("offset" = Option<usize>, Query, description = "Page offset")
    ),
    responses(
        (status = 200, description = "Activity feed for the caller", body = [ActivityDetail])
    ),
    security(("Bearer" = []))
)]
async fn list_activities(
    State(service): State<Service>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<Vec<ActivityDetail>>, ApiError> {
    let activities = service
        .list_activities(&claims.sub, query.group_id.as_deref(), query.limit, query.offset)
        .await?;
    Ok(Json(activities))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses((status = 200, description = "Application log", body = [AppLog])),
    security(("Bearer" = []))
)]
async fn get_app_logs(State(service): State<Service>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs().await?;
    Ok(Json(logs))
}
