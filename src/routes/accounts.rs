use axum::{
    Json, Router,
    extract::State,
    routing::{get, patch},
};

use crate::{
    dto::accounts::{
        ChangeOccupationRequest, ChangeOccupationResponse, EditCustomerRequest,
        EditEmployeeRequest, EmployeeList,
    },
    error::AppResult,
    middleware::auth::AuthPrincipal,
    models::{Customer, Employee},
    response::ApiResponse,
    services::account_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me/customer", get(customer_me).patch(edit_customer))
        .route("/me/employee", get(employee_me).patch(edit_employee))
        .route("/employees", get(list_employees))
        .route("/occupation", patch(change_occupation))
}

#[utoipa::path(
    get,
    path = "/api/accounts/me/customer",
    responses(
        (status = 200, description = "Logged customer", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn customer_me(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = account_service::customer_me(&state.pool, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/accounts/me/customer",
    request_body = EditCustomerRequest,
    responses(
        (status = 200, description = "Updated customer", body = ApiResponse<Customer>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email or phone already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn edit_customer(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<EditCustomerRequest>,
) -> AppResult<Json<ApiResponse<Customer>>> {
    let resp = account_service::edit_customer(&state.pool, &principal, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/accounts/me/employee",
    responses(
        (status = 200, description = "Logged employee", body = ApiResponse<Employee>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn employee_me(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let resp = account_service::employee_me(&state.pool, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/accounts/me/employee",
    request_body = EditEmployeeRequest,
    responses(
        (status = 200, description = "Updated employee", body = ApiResponse<Employee>),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn edit_employee(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<EditEmployeeRequest>,
) -> AppResult<Json<ApiResponse<Employee>>> {
    let resp = account_service::edit_employee(&state.pool, &principal, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/accounts/employees",
    responses(
        (status = 200, description = "All employees", body = ApiResponse<EmployeeList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    principal: AuthPrincipal,
) -> AppResult<Json<ApiResponse<EmployeeList>>> {
    let resp = account_service::list_employees(&state.pool, &principal).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/accounts/occupation",
    request_body = ChangeOccupationRequest,
    responses(
        (status = 200, description = "Occupation changed", body = ApiResponse<ChangeOccupationResponse>),
        (status = 400, description = "Conflicting occupation flags"),
        (status = 403, description = "Requires a manager"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Accounts"
)]
pub async fn change_occupation(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<ChangeOccupationRequest>,
) -> AppResult<Json<ApiResponse<ChangeOccupationResponse>>> {
    let resp = account_service::change_occupation(&state.pool, &principal, payload).await?;
    Ok(Json(resp))
}
