//! Drives a real server over TCP through the client crate.

use expense_tracker_backend::{config::AppConfig, create_router, initialize_backend};
use expense_tracker_frontend::services::normalize::normalize_batch;
use expense_tracker_frontend::{ClientError, ExpenseApi, ExpenseFields, RestClient, SheetClient};
use shared::PayeeRequest;
use tempfile::TempDir;

const API_KEY: &str = "integration-key";
const PASSWORD: &str = "integration-password";

async fn spawn_server() -> (String, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = AppConfig {
        data_dir: temp_dir.path().to_path_buf(),
        api_key: API_KEY.to_string(),
        app_password: PASSWORD.to_string(),
        lock_timeout_ms: 500,
        ..AppConfig::default()
    };
    let app = create_router(initialize_backend(config).await.unwrap());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), temp_dir)
}

fn cafe() -> ExpenseFields {
    ExpenseFields {
        date: Some("2024-05-10".to_string()),
        merchant: Some("Cafe".to_string()),
        amount: Some("4500".to_string()),
        payment_method: Some("card".to_string()),
        payment_cycle: Some(String::new()),
        category: Some(String::new()),
        content: Some(String::new()),
    }
}

#[tokio::test]
async fn create_read_delete_through_the_sheet_surface() {
    let (base_url, temp_dir) = spawn_server().await;
    let client = SheetClient::new(format!("{}/exec", base_url), API_KEY);

    let id = client.create(&cafe()).await.unwrap();

    let expenses = client.fetch_all().await.unwrap();
    let on_day: Vec<_> = expenses.iter().filter(|t| t.date == "2024-05-10").collect();
    assert_eq!(on_day.len(), 1);
    assert_eq!(on_day[0].amount, 4500.0);
    assert_eq!(on_day[0].id, id);

    client.delete(&id).await.unwrap();
    let expenses = client.fetch_all().await.unwrap();
    assert!(expenses.iter().all(|t| t.date != "2024-05-10"));

    let sheet = std::fs::read_to_string(temp_dir.path().join("expenses.csv")).unwrap();
    let row = sheet.lines().find(|line| line.starts_with(id.as_str())).unwrap();
    assert!(row.ends_with("true"));

    // Already deleted rows are gone as far as the surface is concerned
    assert_eq!(client.delete(&id).await, Err(ClientError::NotFound(id.clone())));
    assert_eq!(
        client.delete("no-such-id").await,
        Err(ClientError::NotFound("no-such-id".to_string()))
    );
}

#[tokio::test]
async fn wrong_api_key_is_an_auth_error() {
    let (base_url, _temp_dir) = spawn_server().await;
    let client = SheetClient::new(format!("{}/exec", base_url), "wrong");

    assert!(matches!(client.fetch_all().await, Err(ClientError::Auth(_))));
    assert!(matches!(client.create(&cafe()).await, Err(ClientError::Auth(_))));
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let (base_url, _temp_dir) = spawn_server().await;
    let client = SheetClient::new(format!("{}/exec", base_url), API_KEY);
    let id = client.create(&cafe()).await.unwrap();

    let change = ExpenseFields {
        merchant: Some("X".to_string()),
        ..Default::default()
    };
    client.update(&id, &change).await.unwrap();

    let expenses = client.fetch_all().await.unwrap();
    let updated = expenses.iter().find(|t| t.id == id).unwrap();
    assert_eq!(updated.merchant, "X");
    assert_eq!(updated.amount, 4500.0);
    assert_eq!(updated.payment_method, "card");

    assert!(matches!(
        client.update("missing", &change).await,
        Err(ClientError::NotFound(_))
    ));
}

#[tokio::test]
async fn rest_surface_requires_login() {
    let (base_url, _temp_dir) = spawn_server().await;
    let client = RestClient::with_base_url(base_url).unwrap();

    assert!(matches!(client.fetch_all().await, Err(ClientError::Auth(_))));
    assert!(matches!(client.login("nope").await, Err(ClientError::Auth(_))));

    client.login(PASSWORD).await.unwrap();
    let mut fields = cafe();
    fields.payment_cycle = Some("1M".to_string());
    let id = client.create(&fields).await.unwrap();

    let expenses = client.fetch_all().await.unwrap();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].id, id);

    let missing_method = ExpenseFields {
        payment_method: Some(String::new()),
        ..fields
    };
    assert!(matches!(
        client.create(&missing_method).await,
        Err(ClientError::Validation { .. })
    ));

    let payee = client
        .create_payee(&PayeeRequest {
            name: "Piano Academy".to_string(),
            bank_name: "Shinhan".to_string(),
            account_number: "110-123-456789".to_string(),
            owner_name: "김현아".to_string(),
            payment_cycle: "1M".to_string(),
            amount: None,
        })
        .await
        .unwrap();
    assert_eq!(client.list_payees().await.unwrap(), vec![payee.clone()]);
    client.delete_payee(&payee.id).await.unwrap();
    assert!(client.list_payees().await.unwrap().is_empty());

    client.logout().await.unwrap();
    assert!(matches!(client.fetch_all().await, Err(ClientError::Auth(_))));
}

#[test]
fn normalizer_is_reachable_from_outside_the_crate() {
    let rows = vec![serde_json::json!({"id": "1", "날짜": "2024-01-05", "거래처": "Cafe", "금액": 100})];
    assert_eq!(normalize_batch(&rows)[0].merchant, "Cafe");
}
