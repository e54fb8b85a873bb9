use crate::{
    db::DbPool,
    dto::accounts::{
        ChangeOccupationRequest, ChangeOccupationResponse, EditCustomerRequest,
        EditEmployeeRequest, EmployeeList,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthPrincipal, require_customer, require_employee, require_manager},
    models::{Customer, Employee, Occupation},
    response::{ApiResponse, Meta},
    services::auth_service::{hash_password, map_unique_violation},
};

pub async fn customer_me(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<Customer>> {
    require_customer(principal)?;
    let customer: Option<Customer> = sqlx::query_as("SELECT * FROM customers WHERE id = $1")
        .bind(principal.id)
        .fetch_optional(pool)
        .await?;
    match customer {
        Some(c) => Ok(ApiResponse::success("OK", c, Some(Meta::empty()))),
        None => Err(AppError::NotFound("USER_NOT_FOUND")),
    }
}

pub async fn employee_me(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<Employee>> {
    require_employee(principal)?;
    let employee: Option<Employee> = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(principal.id)
        .fetch_optional(pool)
        .await?;
    match employee {
        Some(e) => Ok(ApiResponse::success("OK", e, Some(Meta::empty()))),
        None => Err(AppError::NotFound("EMPLOYEE_NOT_FOUND")),
    }
}

pub async fn edit_customer(
    pool: &DbPool,
    principal: &AuthPrincipal,
    payload: EditCustomerRequest,
) -> AppResult<ApiResponse<Customer>> {
    require_customer(principal)?;
    let existing: Option<Customer> = sqlx::query_as("SELECT * FROM customers WHERE id = $1")
        .bind(principal.id)
        .fetch_optional(pool)
        .await?;
    let Some(existing) = existing else {
        return Err(AppError::NotFound("USER_NOT_FOUND"));
    };

    let name = payload.name.unwrap_or(existing.name);
    let email = payload.email.unwrap_or(existing.email);
    let phone = payload.phone.unwrap_or(existing.phone);
    let password_hash = match payload.password {
        Some(password) => hash_password(&password)?,
        None => existing.password_hash,
    };

    // A rename onto a taken email/phone is a conflict, same as at registration.
    let customer: Customer = sqlx::query_as(
        "UPDATE customers SET name = $2, email = $3, phone = $4, password_hash = $5 \
         WHERE id = $1 RETURNING *",
    )
    .bind(principal.id)
    .bind(name)
    .bind(email)
    .bind(phone)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, "ACCOUNT_ALREADY_EXISTS"))?;

    Ok(ApiResponse::success(
        "ACCOUNT_UPDATED",
        customer,
        Some(Meta::empty()),
    ))
}

pub async fn edit_employee(
    pool: &DbPool,
    principal: &AuthPrincipal,
    payload: EditEmployeeRequest,
) -> AppResult<ApiResponse<Employee>> {
    require_employee(principal)?;
    let existing: Option<Employee> = sqlx::query_as("SELECT * FROM employees WHERE id = $1")
        .bind(principal.id)
        .fetch_optional(pool)
        .await?;
    let Some(existing) = existing else {
        return Err(AppError::NotFound("EMPLOYEE_NOT_FOUND"));
    };

    let name = payload.name.unwrap_or(existing.name);
    let email = payload.email.unwrap_or(existing.email);
    let password_hash = match payload.password {
        Some(password) => hash_password(&password)?,
        None => existing.password_hash,
    };

    let employee: Employee = sqlx::query_as(
        "UPDATE employees SET name = $2, email = $3, password_hash = $4 \
         WHERE id = $1 RETURNING *",
    )
    .bind(principal.id)
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique_violation(e, "ACCOUNT_ALREADY_EXISTS"))?;

    Ok(ApiResponse::success(
        "ACCOUNT_UPDATED",
        employee,
        Some(Meta::empty()),
    ))
}

pub async fn list_employees(
    pool: &DbPool,
    principal: &AuthPrincipal,
) -> AppResult<ApiResponse<EmployeeList>> {
    require_employee(principal)?;
    let items: Vec<Employee> = sqlx::query_as("SELECT * FROM employees ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(ApiResponse::success(
        "OK",
        EmployeeList { items },
        Some(Meta::empty()),
    ))
}

/// Swapping manager/attendant is itself a manager-only action.
pub async fn change_occupation(
    pool: &DbPool,
    principal: &AuthPrincipal,
    payload: ChangeOccupationRequest,
) -> AppResult<ApiResponse<ChangeOccupationResponse>> {
    let new_occupation = Occupation::from_exclusive_flags(payload.manager, payload.attendant)?;
    require_manager(pool, principal).await?;

    let target: Option<Employee> = sqlx::query_as("SELECT * FROM employees WHERE cpf = $1")
        .bind(payload.cpf.as_str())
        .fetch_optional(pool)
        .await?;
    let Some(target) = target else {
        return Err(AppError::NotFound("EMPLOYEE_NOT_FOUND"));
    };

    sqlx::query("UPDATE employees SET occupation = $2 WHERE id = $1")
        .bind(target.id)
        .bind(new_occupation.as_str())
        .execute(pool)
        .await?;

    tracing::info!(
        employee_id = %target.id,
        from = target.occupation.as_str(),
        to = new_occupation.as_str(),
        "occupation changed"
    );

    Ok(ApiResponse::success(
        "OCCUPATION_CHANGED",
        ChangeOccupationResponse {
            cpf: payload.cpf,
            old_occupation: target.occupation,
            new_occupation,
        },
        Some(Meta::empty()),
    ))
}
