//! Currency repository against PostgreSQL.

use wayfare_db::test_fixtures::{test_database_url, unique_suffix};
use wayfare_db::{
    CurrencyFilter, CurrencyRepository, Database, Error, NewCurrency, UpdateCurrency,
};

async fn setup() -> Database {
    let _ = dotenvy::dotenv();
    let db = Database::connect(&test_database_url())
        .await
        .expect("Failed to connect to test database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

fn currency(code: &str, is_default: bool) -> NewCurrency {
    NewCurrency {
        code: code.to_string(),
        name: format!("Test {}", code),
        is_default,
        ..Default::default()
    }
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_single_default_currency() {
    let db = setup().await;
    let suffix = unique_suffix();

    let first = db
        .currencies
        .create(currency(&format!("d1{}", suffix), true))
        .await
        .expect("create first");
    assert!(first.is_default);
    assert_eq!(first.code, format!("D1{}", suffix));

    let second = db
        .currencies
        .create(currency(&format!("d2{}", suffix), true))
        .await
        .expect("create second");
    assert!(second.is_default);
    assert!(!db.currencies.get(first.id).await.expect("get").is_default);

    // Promoting the first one again demotes the second.
    db.currencies
        .update(
            first.id,
            UpdateCurrency {
                is_default: Some(true),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert!(!db.currencies.get(second.id).await.expect("get").is_default);

    let defaults = db
        .currencies
        .list(CurrencyFilter::default())
        .await
        .expect("list")
        .into_iter()
        .filter(|c| c.is_default)
        .count();
    assert_eq!(defaults, 1);

    db.currencies.delete(first.id).await.expect("cleanup");
    db.currencies.delete(second.id).await.expect("cleanup");
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_duplicate_code_is_rejected() {
    let db = setup().await;
    let code = format!("X{}", unique_suffix());

    let created = db
        .currencies
        .create(currency(&code, false))
        .await
        .expect("create");

    let err = db
        .currencies
        .create(currency(&code.to_lowercase(), false))
        .await
        .unwrap_err();
    match err {
        Error::Duplicate(msg) => assert_eq!(msg, "Currency code already exists"),
        other => panic!("Expected Duplicate, got {:?}", other),
    }

    db.currencies.delete(created.id).await.expect("cleanup");
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_lookup_by_code_and_filters() {
    let db = setup().await;
    let suffix = unique_suffix();
    let code = format!("L{}", suffix);

    let mut inactive = currency(&code, false);
    inactive.is_active = Some(false);
    let created = db.currencies.create(inactive).await.expect("create");
    assert_eq!(created.exchange_rate, 1.0);
    assert_eq!(created.decimal_places, 2);

    let found = db
        .currencies
        .get_by_code(&format!(" {} ", code.to_lowercase()))
        .await
        .expect("get_by_code");
    assert_eq!(found.id, created.id);

    let active = db.currencies.list_active().await.expect("list_active");
    assert!(active.iter().all(|c| c.id != created.id));

    let filtered = db
        .currencies
        .list(CurrencyFilter {
            search: Some(suffix.clone()),
            ..Default::default()
        })
        .await
        .expect("list");
    assert_eq!(filtered.len(), 1);

    db.currencies.delete(created.id).await.expect("cleanup");
    assert!(matches!(
        db.currencies.get_by_code(&code).await.unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL
async fn test_update_null_clears_symbol() {
    let db = setup().await;
    let code = format!("S{}", unique_suffix());

    let mut req = currency(&code, false);
    req.symbol = Some("¤".to_string());
    req.exchange_rate = Some(3.5);
    let created = db.currencies.create(req).await.expect("create");

    let updated = db
        .currencies
        .update(
            created.id,
            UpdateCurrency {
                symbol: Some(None),
                display_order: Some(7),
                ..Default::default()
            },
        )
        .await
        .expect("update");
    assert_eq!(updated.symbol, None);
    assert_eq!(updated.display_order, 7);
    assert_eq!(updated.exchange_rate, 3.5);
    assert_eq!(updated.name, created.name);

    db.currencies.delete(created.id).await.expect("cleanup");
}
