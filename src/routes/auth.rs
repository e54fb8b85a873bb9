use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{patch, post},
};

use crate::{
    dto::auth::{
        ChangePasswordRequest, ChangePasswordResponse, ForgotPasswordRequest,
        ForgotPasswordResponse, LoginRequest, LoginResponse, RegisterCustomerRequest,
        RegisterEmployeeRequest, RegisteredAccount,
    },
    error::AppResult,
    middleware::auth::AuthPrincipal,
    response::ApiResponse,
    services::auth_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/customer", post(register_customer))
        .route("/register/employee", post(register_employee))
        .route("/login/customer", post(login_customer))
        .route("/login/employee", post(login_employee))
        .route("/forgot-password", post(forgot_password))
        .route("/change-password", patch(change_password))
}

#[utoipa::path(
    post,
    path = "/api/auth/register/customer",
    request_body = RegisterCustomerRequest,
    responses(
        (status = 201, description = "Register customer", body = ApiResponse<RegisteredAccount>),
        (status = 409, description = "Email already exists")
    ),
    tag = "Auth"
)]
pub async fn register_customer(
    State(state): State<AppState>,
    Json(payload): Json<RegisterCustomerRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisteredAccount>>)> {
    let resp = auth_service::register_customer(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/register/employee",
    request_body = RegisterEmployeeRequest,
    responses(
        (status = 201, description = "Register employee", body = ApiResponse<RegisteredAccount>),
        (status = 400, description = "Conflicting occupation flags"),
        (status = 409, description = "Email already exists")
    ),
    tag = "Auth"
)]
pub async fn register_employee(
    State(state): State<AppState>,
    Json(payload): Json<RegisterEmployeeRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<RegisteredAccount>>)> {
    let resp = auth_service::register_employee(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    post,
    path = "/api/auth/login/customer",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login customer", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login_customer(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_customer(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/login/employee",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login employee", body = ApiResponse<LoginResponse>),
        (status = 400, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login_employee(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let resp = auth_service::login_employee(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Recovery code issued", body = ApiResponse<ForgotPasswordResponse>),
        (status = 404, description = "Account not found")
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> AppResult<Json<ApiResponse<ForgotPasswordResponse>>> {
    let resp = auth_service::forgot_password(&state, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse<ChangePasswordResponse>),
        (status = 400, description = "Invalid recovery token")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    State(state): State<AppState>,
    principal: AuthPrincipal,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<ApiResponse<ChangePasswordResponse>>> {
    let resp = auth_service::change_password(&state, &principal, payload).await?;
    Ok(Json(resp))
}
