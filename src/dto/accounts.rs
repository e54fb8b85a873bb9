use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Employee, Occupation};

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditCustomerRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditEmployeeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeList {
    pub items: Vec<Employee>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeOccupationRequest {
    pub cpf: String,
    pub manager: Option<bool>,
    pub attendant: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChangeOccupationResponse {
    pub cpf: String,
    pub old_occupation: Occupation,
    pub new_occupation: Occupation,
}
