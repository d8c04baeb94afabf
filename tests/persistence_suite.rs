mod common;

use std::fs;

use common::{expense, json_store, open_manager, temp_base};
use wallet_core::{
    config::{Config, ConfigManager},
    storage::{SnapshotStore, DEFAULT_RETENTION},
    Amount, Category, LedgerError, LedgerManager,
};

#[test]
fn snapshot_survives_reopen() {
    let base = temp_base();
    let (mut manager, _) = open_manager(&base);
    manager
        .add_transaction(expense("Train", 450, "2024-06-01", Category::Travel))
        .unwrap();
    manager
        .add_transaction(expense("Concert", 900, "2024-06-03", Category::Entertainment))
        .unwrap();
    manager.add_balance_f64(12.5).unwrap();

    let (reopened, report) = open_manager(&base);
    assert!(report.restored);
    assert!(report.warnings.is_empty());
    assert_eq!(reopened.balance(), "3662.5".parse::<Amount>().unwrap());
    assert_eq!(reopened.ledger().transactions(), manager.ledger().transactions());
}

#[test]
fn atomic_save_failure_preserves_original_file() {
    let base = temp_base();
    let (mut manager, _) = open_manager(&base);
    manager
        .add_transaction(expense("Taxi", 80, "2024-06-01", Category::Travel))
        .unwrap();
    let path = base.join("wallet.json");
    let original = fs::read_to_string(&path).unwrap();

    // A directory at the temp path makes the write fail before the rename.
    fs::create_dir_all(base.join("wallet.json.tmp")).unwrap();

    let applied = manager
        .add_transaction(expense("Lunch", 20, "2024-06-02", Category::Food))
        .unwrap();
    assert!(!applied.persisted);
    assert!(matches!(
        manager.last_persistence_warning(),
        Some(LedgerError::PersistenceUnavailable(_))
    ));
    assert_eq!(manager.balance(), Amount::from_units(4900));
    assert_eq!(fs::read_to_string(&path).unwrap(), original);

    fs::remove_dir(base.join("wallet.json.tmp")).unwrap();
    manager.add_balance(Amount::from_units(5)).unwrap();
    assert!(manager.last_persistence_warning().is_none());
    let (reopened, _) = open_manager(&base);
    assert_eq!(reopened.balance(), Amount::from_units(4905));
}

#[test]
fn backups_are_rotated_to_the_retention_limit() {
    let base = temp_base();
    let backups = base.join("backups");
    fs::create_dir_all(&backups).unwrap();
    for day in 1..=4 {
        fs::write(backups.join(format!("wallet_2020010{day}_120000_000000.json")), "{}").unwrap();
    }

    let store = json_store(&base, 3);
    let (mut manager, _) = LedgerManager::open(Box::new(store.clone()), Amount::from_units(5000));
    manager
        .add_transaction(expense("Book", 15, "2024-07-01", Category::Entertainment))
        .unwrap();
    manager
        .add_transaction(expense("Soup", 9, "2024-07-02", Category::Food))
        .unwrap();

    let listed = store.list_backups().unwrap();
    assert_eq!(listed.len(), 3);
    assert!(listed[0].created_at > listed[1].created_at);
    assert!(!backups.join("wallet_20200101_120000_000000.json").exists());
    assert!(!backups.join("wallet_20200102_120000_000000.json").exists());
}

#[test]
fn zero_retention_disables_backups() {
    let base = temp_base();
    let store = json_store(&base, 0);
    let (mut manager, _) = LedgerManager::open(Box::new(store.clone()), Amount::from_units(5000));
    manager.add_balance(Amount::from_units(1)).unwrap();
    manager.add_balance(Amount::from_units(1)).unwrap();
    assert!(store.list_backups().unwrap().is_empty());
    assert!(!base.join("backups").exists());
}

#[test]
fn malformed_file_falls_back_to_defaults() {
    let base = temp_base();
    fs::write(base.join("wallet.json"), "{\"balance\": ").unwrap();
    let (manager, report) = open_manager(&base);
    assert!(!report.restored);
    assert!(matches!(
        report.warnings.as_slice(),
        [LedgerError::PersistenceUnavailable(_)]
    ));
    assert_eq!(manager.balance(), Amount::from_units(5000));
}

#[test]
fn invalid_snapshot_contents_fall_back_to_defaults() {
    let base = temp_base();
    fs::write(
        base.join("wallet.json"),
        r#"{"balance": -10, "transactions": []}"#,
    )
    .unwrap();
    let (manager, report) = open_manager(&base);
    assert!(!report.restored);
    assert_eq!(report.warnings.len(), 1);
    assert_eq!(manager.balance(), Amount::from_units(5000));
}

#[test]
fn legacy_wallet_file_is_migrated_in_place() {
    let base = temp_base();
    fs::write(
        base.join("wallet.json"),
        r#"{
            "balance": 4650,
            "expense": {
                "Travel": [{"title": "Cab", "amount": "150", "date": "2024-01-03"}],
                "Food": [
                    {"title": "Pizza", "amount": 200, "date": "2024-01-01"}
                ]
            }
        }"#,
    )
    .unwrap();

    let (manager, report) = open_manager(&base);
    assert!(report.restored);
    assert!(!report.migrations.is_empty());
    assert_eq!(manager.balance(), Amount::from_units(4650));
    assert_eq!(manager.ledger().category_total(Category::Food), Amount::from_units(200));
    assert_eq!(manager.ledger().category_total(Category::Travel), Amount::from_units(150));

    let rewritten = fs::read_to_string(base.join("wallet.json")).unwrap();
    assert!(rewritten.contains("\"transactions\""));
    assert!(!rewritten.contains("\"expense\""));

    let (reopened, report) = open_manager(&base);
    assert!(report.migrations.is_empty());
    assert_eq!(reopened.snapshot(), manager.snapshot());
}

#[test]
fn configured_location_and_starting_balance_are_used() {
    let base = temp_base();
    let config_manager = ConfigManager::with_base_dir(&base);
    let mut config = Config::default();
    config.initial_balance = Amount::from_units(250);
    config.ledger_file = Some(base.join("custom").join("pocket.json"));
    config_manager.save(&config).unwrap();

    let loaded = config_manager.load().unwrap();
    let (mut manager, report) = LedgerManager::from_config(&loaded, config_manager.base_dir());
    assert!(!report.restored);
    assert_eq!(manager.balance(), Amount::from_units(250));
    manager
        .add_transaction(expense("Ice cream", 4, "2024-08-01", Category::Food))
        .unwrap();
    assert!(base.join("custom").join("pocket.json").exists());
    assert!(!base.join("wallet.json").exists());
    assert_eq!(loaded.backup_retention, DEFAULT_RETENTION);
}

#[test]
fn store_round_trips_through_the_trait() {
    let base = temp_base();
    let store = json_store(&base, 2);
    assert!(store.load().unwrap().is_none());

    let (mut manager, _) = LedgerManager::open(Box::new(store.clone()), Amount::from_units(5000));
    manager
        .add_transaction(expense("Fuel", 60, "2024-09-09", Category::Travel))
        .unwrap();

    let loaded = store.load().unwrap().expect("snapshot written");
    assert!(loaded.migrations.is_empty());
    assert_eq!(loaded.snapshot, manager.snapshot());
    assert!(store.describe().ends_with("wallet.json"));
}
