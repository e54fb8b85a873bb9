use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterCustomerRequest {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub phone: String,
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterEmployeeRequest {
    pub name: String,
    pub email: String,
    pub cpf: String,
    pub password: String,
    pub manager: Option<bool>,
    pub attendant: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisteredAccount {
    pub id: Uuid,
    pub email: String,
}

/// `login` may be email, cpf or (for customers) phone.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub login: String,
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ForgotPasswordRequest {
    pub cpf: String,
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForgotPasswordResponse {
    pub cpf: String,
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub password: String,
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangePasswordResponse {
    pub id: Uuid,
}
