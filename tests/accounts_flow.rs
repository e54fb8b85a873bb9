use iceberg_storefront::{
    db::{DbPool, create_pool},
    dto::accounts::{EditCustomerRequest, EditEmployeeRequest},
    error::AppError,
    middleware::auth::AuthPrincipal,
    services::account_service,
    state::AppState,
    token::{PrincipalKind, TokenCodec},
};
use uuid::Uuid;

// Profile edits: patch-merge semantics, duplicate unique fields surfacing as
// conflicts, and the role gate on each side.
#[tokio::test]
async fn profile_edit_flow() -> anyhow::Result<()> {
    // Allow skipping when no DB is configured in the environment.
    let database_url =
        match std::env::var("TEST_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL")) {
            Ok(url) => url,
            Err(_) => {
                eprintln!(
                    "Skipping test: set TEST_DATABASE_URL or DATABASE_URL to run integration flow tests."
                );
                return Ok(());
            }
        };

    let state = setup_state(&database_url).await?;
    let pool = &state.pool;

    let ana_id = create_customer(pool, "ana@example.com", "11111111111").await?;
    let _bia_id = create_customer(pool, "bia@example.com", "33333333333").await?;
    let clerk_id = create_employee(pool, "clerk@example.com", "22222222222").await?;
    let _boss_id = create_employee(pool, "boss@example.com", "44444444444").await?;

    let ana = AuthPrincipal {
        id: ana_id,
        kind: PrincipalKind::Customer,
    };
    let clerk = AuthPrincipal {
        id: clerk_id,
        kind: PrincipalKind::Employee,
    };

    // Renaming yourself onto a taken email is a conflict, not a 500.
    let err = account_service::edit_customer(
        pool,
        &ana,
        EditCustomerRequest {
            name: None,
            email: Some("bia@example.com".into()),
            phone: None,
            password: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Untouched fields survive a partial edit.
    let updated = account_service::edit_customer(
        pool,
        &ana,
        EditCustomerRequest {
            name: Some("Ana Prime".into()),
            email: None,
            phone: None,
            password: None,
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.name, "Ana Prime");
    assert_eq!(updated.email, "ana@example.com");

    // Employees edit their own profile the same way.
    let updated = account_service::edit_employee(
        pool,
        &clerk,
        EditEmployeeRequest {
            name: Some("Clerk Prime".into()),
            email: Some("clerk.prime@example.com".into()),
            password: Some("new-secret".into()),
        },
    )
    .await?
    .data
    .unwrap();
    assert_eq!(updated.name, "Clerk Prime");
    assert_eq!(updated.email, "clerk.prime@example.com");
    assert_ne!(updated.password_hash, "dummy");

    let me = account_service::employee_me(pool, &clerk).await?.data.unwrap();
    assert_eq!(me.email, "clerk.prime@example.com");

    // Duplicate email on the employee side is a conflict too.
    let err = account_service::edit_employee(
        pool,
        &clerk,
        EditEmployeeRequest {
            name: None,
            email: Some("boss@example.com".into()),
            password: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Each edit endpoint is gated to its own principal type.
    let err = account_service::edit_employee(
        pool,
        &ana,
        EditEmployeeRequest {
            name: Some("Nope".into()),
            email: None,
            password: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));
    let err = account_service::edit_customer(
        pool,
        &clerk,
        EditCustomerRequest {
            name: Some("Nope".into()),
            email: None,
            phone: None,
            password: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::Forbidden));

    Ok(())
}

async fn setup_state(database_url: &str) -> anyhow::Result<AppState> {
    let pool = create_pool(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    // Clean tables between runs
    sqlx::query(
        "TRUNCATE TABLE order_items, orders, password_resets, products, employees, customers CASCADE",
    )
    .execute(&pool)
    .await?;

    Ok(AppState {
        pool,
        tokens: TokenCodec::new("test-secret", 0),
    })
}

async fn create_customer(pool: &DbPool, email: &str, cpf: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO customers (id, name, email, cpf, phone, password_hash) \
         VALUES ($1, $2, $3, $4, $5, 'dummy')",
    )
    .bind(id)
    .bind("Test Customer")
    .bind(email)
    .bind(cpf)
    .bind(format!("+55{cpf}"))
    .execute(pool)
    .await?;
    Ok(id)
}

async fn create_employee(pool: &DbPool, email: &str, cpf: &str) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO employees (id, name, email, cpf, password_hash, occupation) \
         VALUES ($1, $2, $3, $4, 'dummy', 'attendant')",
    )
    .bind(id)
    .bind("Test Clerk")
    .bind(email)
    .bind(cpf)
    .execute(pool)
    .await?;
    Ok(id)
}
