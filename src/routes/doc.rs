use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        accounts::{
            ChangeOccupationRequest, ChangeOccupationResponse, EditCustomerRequest,
            EditEmployeeRequest, EmployeeList,
        },
        auth::{
            ChangePasswordRequest, ChangePasswordResponse, ForgotPasswordRequest,
            ForgotPasswordResponse, LoginRequest, LoginResponse, RegisterCustomerRequest,
            RegisterEmployeeRequest, RegisteredAccount,
        },
        orders::{CreateOrderRequest, CreateOrderResponse, OrderItemView, OrderView, OrderViewList, ReviewOrderRequest},
        products::{CreateProductRequest, ProductList, UpdateProductRequest, UpdateProductStatusRequest},
    },
    error::ErrorBody,
    models::{Customer, Employee, Order, OrderItem, Product},
    response::{ApiResponse, Meta},
    routes::{accounts, auth, health, orders, products, store},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::register_customer,
        auth::register_employee,
        auth::login_customer,
        auth::login_employee,
        auth::forgot_password,
        auth::change_password,
        accounts::customer_me,
        accounts::edit_customer,
        accounts::employee_me,
        accounts::edit_employee,
        accounts::list_employees,
        accounts::change_occupation,
        products::create_product,
        products::list_active_products,
        products::list_all_products,
        products::get_product,
        products::update_product,
        products::delete_product,
        products::set_product_status,
        orders::create_order,
        orders::list_orders,
        orders::list_active_orders,
        orders::get_order,
        orders::cancel_order,
        store::list_open_orders,
        store::review_order,
        store::cancel_accepted_order,
        store::finish_accepted_order
    ),
    components(
        schemas(
            Customer,
            Employee,
            Product,
            Order,
            OrderItem,
            RegisterCustomerRequest,
            RegisterEmployeeRequest,
            RegisteredAccount,
            LoginRequest,
            LoginResponse,
            ForgotPasswordRequest,
            ForgotPasswordResponse,
            ChangePasswordRequest,
            ChangePasswordResponse,
            EditCustomerRequest,
            EditEmployeeRequest,
            EmployeeList,
            ChangeOccupationRequest,
            ChangeOccupationResponse,
            CreateProductRequest,
            UpdateProductRequest,
            UpdateProductStatusRequest,
            ProductList,
            CreateOrderRequest,
            CreateOrderResponse,
            ReviewOrderRequest,
            OrderItemView,
            OrderView,
            OrderViewList,
            ErrorBody,
            Meta,
            ApiResponse<Product>,
            ApiResponse<ProductList>,
            ApiResponse<OrderView>,
            ApiResponse<OrderViewList>,
            ApiResponse<CreateOrderResponse>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Registration, login and password recovery"),
        (name = "Accounts", description = "Logged account views and occupation management"),
        (name = "Products", description = "Product catalog"),
        (name = "Orders", description = "Customer orders"),
        (name = "Store", description = "Store-side order handling"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
