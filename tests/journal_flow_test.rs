//! Store-level flows that span adapters: CSV export/import round trips
//! through the SQLite store.

mod common;

use tradejournal::adapters::csv_adapter::CsvAdapter;
use tradejournal::adapters::sqlite_adapter::SqliteAdapter;
use tradejournal::domain::entry::{CapitalUnit, NewEntry, Outcome, Side};
use tradejournal::ports::journal_port::JournalPort;

use common::{date, entry_on};

fn store_with_owner() -> (SqliteAdapter, i64) {
    let store = SqliteAdapter::in_memory().unwrap();
    store.initialize_schema().unwrap();
    let owner = store.create_user("trader", "token").unwrap();
    (store, owner.id)
}

#[test]
fn export_import_round_trip_through_the_store() {
    let (store, owner_id) = store_with_owner();
    store
        .insert(
            owner_id,
            NewEntry {
                capital: Some(1000.0),
                instrument: Some("EURUSD".into()),
                side: Some(Side::Long),
                entry_price: Some(1.08),
                take_profit: Some(1.10),
                stop_loss: Some(1.07),
                outcome: Some(Outcome::Win),
                profit: Some(150.0),
                entry_reason: Some("london breakout".into()),
                ..entry_on("2024-03-01")
            },
        )
        .unwrap();
    store
        .insert(
            owner_id,
            NewEntry {
                capital: Some(500.0),
                capital_unit: CapitalUnit::Minor,
                profit: Some(-25.0),
                outcome: Some(Outcome::Lose),
                ..entry_on("2024-03-02")
            },
        )
        .unwrap();

    let rows = store.fetch_all_for_owner(owner_id).unwrap();
    let mut buf = Vec::new();
    CsvAdapter::export(&rows, &mut buf).unwrap();

    // Import into a fresh store for a different owner.
    let (second_store, second_owner) = store_with_owner();
    let entries = CsvAdapter::import(buf.as_slice()).unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        second_store.insert(second_owner, entry).unwrap();
    }

    let imported = second_store.fetch_all_for_owner(second_owner).unwrap();
    assert_eq!(imported.len(), 2);

    assert_eq!(imported[0].date, date(2024, 3, 1));
    assert_eq!(imported[0].instrument.as_deref(), Some("EURUSD"));
    assert_eq!(imported[0].side, Some(Side::Long));
    assert_eq!(imported[0].profit, Some(150.0));
    assert_eq!(imported[0].entry_reason.as_deref(), Some("london breakout"));

    // Cent-account amounts stay canonical base units across the trip.
    assert_eq!(imported[1].capital_unit, CapitalUnit::Minor);
    assert_eq!(imported[1].capital, Some(500.0));
    assert_eq!(imported[1].profit, Some(-25.0));
}

#[test]
fn export_to_disk_and_back() {
    let (store, owner_id) = store_with_owner();
    store
        .insert(
            owner_id,
            NewEntry {
                profit: Some(10.0),
                ..entry_on("2024-03-01")
            },
        )
        .unwrap();

    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("journal.csv");

    let rows = store.fetch_all_for_owner(owner_id).unwrap();
    CsvAdapter::export_to_path(&rows, &path).unwrap();

    let entries = CsvAdapter::import_from_path(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].profit, Some(10.0));
}
