use chrono::{Duration, TimeZone, Utc};
use demand_forecast::data::{
    MemoryStore, Product, StoreLoader, Transaction, TransactionStore, UNKNOWN,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn sale(product_id: u32, days_ago: i64) -> Transaction {
    Transaction::new(
        product_id,
        2.0,
        10.0,
        20.0,
        Utc::now() - Duration::days(days_ago),
        Some("online".to_string()),
        Some("Downtown".to_string()),
        Some("Electronics".to_string()),
        Some("Acme".to_string()),
        12.0,
        Some("Premium".to_string()),
        Some("Berlin".to_string()),
    )
}

#[test]
fn test_absent_attributes_default_to_unknown_at_ingestion() {
    let tx = Transaction::new(
        1,
        1.0,
        5.0,
        5.0,
        Utc::now(),
        None,
        Some("  ".to_string()),
        None,
        Some("Acme".to_string()),
        6.0,
        None,
        None,
    );

    assert_eq!(tx.sales_channel, UNKNOWN);
    assert_eq!(tx.store_location, UNKNOWN);
    assert_eq!(tx.category, UNKNOWN);
    assert_eq!(tx.brand, "Acme");
    assert_eq!(tx.customer_segment, UNKNOWN);
    assert_eq!(tx.customer_city, UNKNOWN);
}

#[test]
fn test_fetch_filters_by_product_and_date() {
    let mut store = MemoryStore::new();
    store.add_transaction(sale(1, 5));
    store.add_transaction(sale(1, 400));
    store.add_transaction(sale(2, 5));

    let since = Utc::now() - Duration::days(30);
    let all_recent = store.fetch_transactions(None, since).unwrap();
    assert_eq!(all_recent.len(), 2);

    let product_one = store.fetch_transactions(Some(1), since).unwrap();
    assert_eq!(product_one.len(), 1);
    assert_eq!(product_one[0].product_id, 1);
}

#[test]
fn test_fetch_orders_by_sale_date_ascending() {
    let mut store = MemoryStore::new();
    store.add_transaction(sale(1, 2));
    store.add_transaction(sale(1, 10));
    store.add_transaction(sale(1, 6));

    let rows = store
        .fetch_transactions(None, Utc::now() - Duration::days(365))
        .unwrap();
    assert!(rows.windows(2).all(|w| w[0].sale_date <= w[1].sale_date));
}

#[test]
fn test_product_lookup() {
    let mut store = MemoryStore::new();
    store.add_product(Product {
        id: 3,
        name: "Widget".to_string(),
        stock_quantity: 12.0,
        reorder_level: 4.0,
    });

    let found = store.get_product(3).unwrap().unwrap();
    assert_eq!(found.name, "Widget");
    assert!(store.get_product(99).unwrap().is_none());
}

#[test]
fn test_csv_loader_round_trip() {
    let ts = Utc.with_ymd_and_hms(2023, 6, 5, 12, 0, 0).unwrap().timestamp();
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "product_id,quantity,unit_price,final_amount,sale_date,sales_channel,store_location,category,brand,list_price,customer_segment,customer_city"
    )
    .unwrap();
    writeln!(
        file,
        "1,2.5,10.0,25.0,{ts},online,Downtown,Electronics,Acme,12.0,Premium,Berlin"
    )
    .unwrap();
    writeln!(file, "2,1.0,5.0,5.0,{ts},,,,,6.0,,").unwrap();
    file.flush().unwrap();

    let store = StoreLoader::from_csv(file.path()).unwrap();
    assert_eq!(store.len(), 2);

    let rows = store
        .fetch_transactions(None, Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap())
        .unwrap();
    assert_eq!(rows[0].product_id, 1);
    assert_eq!(rows[0].quantity, 2.5);
    assert_eq!(rows[0].category, "Electronics");

    // Empty categorical cells default to Unknown
    let second = rows.iter().find(|r| r.product_id == 2).unwrap();
    assert_eq!(second.category, UNKNOWN);
    assert_eq!(second.brand, UNKNOWN);

    // Product master rows are synthesized for the ids seen
    assert!(store.get_product(1).unwrap().is_some());
    assert!(store.get_product(2).unwrap().is_some());
}

#[test]
fn test_csv_loader_rejects_missing_columns() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "product_id,quantity").unwrap();
    writeln!(file, "1,2.0").unwrap();
    file.flush().unwrap();

    assert!(StoreLoader::from_csv(file.path()).is_err());
}
