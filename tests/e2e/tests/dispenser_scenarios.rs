//! Dispenser status fetch + eligibility scenarios

use rust_decimal_macros::dec;
use tidepool_e2e_tests::MockLedger;
use tidepool_trader::{Address, DispenserPolicy, DispenserStatus, DispenserStatusSource};

const TOKEN: Address = Address([0x30; 20]);

fn status() -> DispenserStatus {
    DispenserStatus {
        active: true,
        max_tokens: dec!(1000),
        max_balance: dec!(500),
        balance: dec!(200),
        is_minter: false,
    }
}

#[tokio::test]
async fn fetched_status_drives_the_policy() {
    let ledger = MockLedger::new().with_dispenser(TOKEN, status());

    let fetched = ledger.dispenser_status(TOKEN).await.unwrap();

    // Reservoir covers a 200 request but not 201 without minting rights
    assert!(DispenserPolicy::is_dispensable(&fetched, dec!(0), dec!(200)));
    assert!(!DispenserPolicy::is_dispensable(&fetched, dec!(0), dec!(201)));
    assert_eq!(DispenserPolicy::max_dispensable(&fetched, dec!(0)), dec!(200));
}

#[tokio::test]
async fn inactive_dispenser_admits_nothing_for_any_amount() {
    let mut inactive = status();
    inactive.active = false;
    let ledger = MockLedger::new().with_dispenser(TOKEN, inactive);

    let fetched = ledger.dispenser_status(TOKEN).await.unwrap();

    for amount in [dec!(0), dec!(1), dec!(1000)] {
        assert!(!DispenserPolicy::is_dispensable(&fetched, dec!(0), amount));
    }
    assert_eq!(DispenserPolicy::max_dispensable(&fetched, dec!(0)), dec!(0));
}

#[tokio::test]
async fn minting_rights_cover_a_dry_reservoir() {
    let mut minting = status();
    minting.balance = dec!(0);
    minting.is_minter = true;
    let ledger = MockLedger::new().with_dispenser(TOKEN, minting);

    let fetched = ledger.dispenser_status(TOKEN).await.unwrap();

    assert!(DispenserPolicy::is_dispensable(&fetched, dec!(0), dec!(1000)));
    assert_eq!(
        DispenserPolicy::max_dispensable(&fetched, dec!(0)),
        dec!(1000)
    );
}

#[tokio::test]
async fn unknown_dispenser_is_a_collaborator_failure() {
    let ledger = MockLedger::new();

    let err = ledger.dispenser_status(TOKEN).await.unwrap_err();

    assert_eq!(err.action, "dispenser_status");
}
