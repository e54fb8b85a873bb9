use argon2::{
    Argon2, PasswordHasher,
    password_hash::{PasswordHash, PasswordVerifier, SaltString},
};
use chrono::Utc;
use password_hash::rand_core::OsRng;
use uuid::Uuid;

use crate::{
    dto::auth::{
        ChangePasswordRequest, ChangePasswordResponse, ForgotPasswordRequest,
        ForgotPasswordResponse, LoginRequest, LoginResponse, RegisterCustomerRequest,
        RegisterEmployeeRequest, RegisteredAccount,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthPrincipal,
    models::{Customer, Employee, Occupation, PasswordReset},
    response::{ApiResponse, Meta},
    state::AppState,
    token::PrincipalKind,
};

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Duplicate unique fields (email, cpf, phone) surface as a conflict, not as
/// an opaque storage failure.
pub(crate) fn map_unique_violation(err: sqlx::Error, code: &str) -> AppError {
    if err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation())
    {
        AppError::Conflict(code.to_string())
    } else {
        AppError::Db(err)
    }
}

pub async fn register_customer(
    state: &AppState,
    payload: RegisterCustomerRequest,
) -> AppResult<ApiResponse<RegisteredAccount>> {
    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM customers WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("EMAIL_ALREADY_EXISTS".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let customer: Customer = sqlx::query_as(
        "INSERT INTO customers (id, name, email, cpf, phone, password_hash) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.email)
    .bind(payload.cpf)
    .bind(payload.phone)
    .bind(password_hash)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| map_unique_violation(e, "ACCOUNT_ALREADY_EXISTS"))?;

    tracing::info!(customer_id = %customer.id, "customer registered");

    Ok(ApiResponse::success(
        "ACCOUNT_CREATED_WITH_SUCCESS",
        RegisteredAccount {
            id: customer.id,
            email: customer.email,
        },
        None,
    ))
}

pub async fn register_employee(
    state: &AppState,
    payload: RegisterEmployeeRequest,
) -> AppResult<ApiResponse<RegisteredAccount>> {
    let occupation = Occupation::from_flags(payload.manager, payload.attendant)?;

    let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM employees WHERE email = $1")
        .bind(payload.email.as_str())
        .fetch_optional(&state.pool)
        .await?;
    if exists.is_some() {
        return Err(AppError::Conflict("EMAIL_ALREADY_EXISTS".into()));
    }

    let password_hash = hash_password(&payload.password)?;
    let employee: Employee = sqlx::query_as(
        "INSERT INTO employees (id, name, email, cpf, password_hash, occupation) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
    )
    .bind(Uuid::new_v4())
    .bind(payload.name)
    .bind(payload.email)
    .bind(payload.cpf)
    .bind(password_hash)
    .bind(occupation.as_str())
    .fetch_one(&state.pool)
    .await
    .map_err(|e| map_unique_violation(e, "ACCOUNT_ALREADY_EXISTS"))?;

    tracing::info!(employee_id = %employee.id, occupation = occupation.as_str(), "employee registered");

    Ok(ApiResponse::success(
        "ACCOUNT_CREATED_WITH_SUCCESS",
        RegisteredAccount {
            id: employee.id,
            email: employee.email,
        },
        None,
    ))
}

pub async fn login_customer(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let customer: Option<Customer> = sqlx::query_as(
        "SELECT * FROM customers WHERE email = $1 OR cpf = $1 OR phone = $1",
    )
    .bind(payload.login.as_str())
    .fetch_optional(&state.pool)
    .await?;

    let Some(customer) = customer.filter(|c| verify_password(&payload.password, &c.password_hash))
    else {
        return Err(AppError::BadRequest("LOGIN_OR_PASSWORD_INCORRECT".into()));
    };

    let token = state.tokens.issue(customer.id, PrincipalKind::Customer)?;

    Ok(ApiResponse::success(
        "LOGIN_SUCCESSFUL",
        LoginResponse {
            login: payload.login,
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn login_employee(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let employee: Option<Employee> =
        sqlx::query_as("SELECT * FROM employees WHERE email = $1 OR cpf = $1")
            .bind(payload.login.as_str())
            .fetch_optional(&state.pool)
            .await?;

    let Some(employee) = employee.filter(|e| verify_password(&payload.password, &e.password_hash))
    else {
        return Err(AppError::BadRequest("LOGIN_OR_PASSWORD_INCORRECT".into()));
    };

    let token = state.tokens.issue(employee.id, PrincipalKind::Employee)?;

    Ok(ApiResponse::success(
        "LOGIN_SUCCESSFUL",
        LoginResponse {
            login: payload.login,
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn forgot_password(
    state: &AppState,
    payload: ForgotPasswordRequest,
) -> AppResult<ApiResponse<ForgotPasswordResponse>> {
    let customer: Option<Customer> =
        sqlx::query_as("SELECT * FROM customers WHERE email = $1 AND cpf = $2")
            .bind(payload.email.as_str())
            .bind(payload.cpf.as_str())
            .fetch_optional(&state.pool)
            .await?;
    let Some(customer) = customer else {
        return Err(AppError::NotFound("USER_NOT_FOUND"));
    };

    // Single-use recovery code; delivery (mail) is outside this service, so
    // it is only persisted and traced.
    let recovery = Uuid::new_v4().simple().to_string();
    sqlx::query(
        "INSERT INTO password_resets (id, token, customer_id, requisition_date) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(Uuid::new_v4())
    .bind(recovery.as_str())
    .bind(customer.id)
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    tracing::debug!(customer_id = %customer.id, "password recovery code issued");

    let token = state.tokens.issue(customer.id, PrincipalKind::Customer)?;

    Ok(ApiResponse::success(
        "RECOVERY_CODE_ISSUED",
        ForgotPasswordResponse {
            cpf: customer.cpf,
            token,
        },
        Some(Meta::empty()),
    ))
}

pub async fn change_password(
    state: &AppState,
    principal: &AuthPrincipal,
    payload: ChangePasswordRequest,
) -> AppResult<ApiResponse<ChangePasswordResponse>> {
    let password_hash = hash_password(&payload.password)?;

    let mut txn = state.pool.begin().await?;

    let reset: Option<PasswordReset> = sqlx::query_as(
        "SELECT * FROM password_resets \
         WHERE token = $1 AND customer_id = $2 AND utilized = false",
    )
    .bind(payload.token.as_str())
    .bind(principal.id)
    .fetch_optional(&mut *txn)
    .await?;
    let Some(reset) = reset else {
        return Err(AppError::BadRequest(
            "INVALID_TOKEN_TO_CHANGE_PASSWORD".into(),
        ));
    };

    sqlx::query("UPDATE customers SET password_hash = $2 WHERE id = $1")
        .bind(principal.id)
        .bind(password_hash)
        .execute(&mut *txn)
        .await?;
    sqlx::query("UPDATE password_resets SET utilized = true WHERE id = $1")
        .bind(reset.id)
        .execute(&mut *txn)
        .await?;

    txn.commit().await?;

    Ok(ApiResponse::success(
        "SUCCESS_CHANGE_PASSWORD",
        ChangePasswordResponse { id: principal.id },
        Some(Meta::empty()),
    ))
}
