//! End-to-end orchestration scenarios against the mock ledger
//!
//! Each scenario asserts both the outcome and the exact sequence of mutating
//! collaborator calls, because the core's contract is as much about which
//! calls are *not* issued on rejection as about the happy path.

use rust_decimal_macros::dec;
use tidepool_amm::WeightedMath;
use tidepool_e2e_tests::{IssuedCall, MockLedger};
use tidepool_trader::{Address, TradeError, TraderConfig, TradingOrchestrator};

const ACCOUNT: Address = Address([0xaa; 20]);
const QUOTE: Address = Address([0x0c; 20]);
const POOL: Address = Address([0x10; 20]);
const ASSET: Address = Address([0x20; 20]);

/// Symmetric 1000/1000 pool, 5/5 weights, 0.3% fee, 100 shares outstanding
fn setup() -> (MockLedger, TradingOrchestrator<MockLedger, MockLedger>) {
    let ledger = MockLedger::new()
        .with_pool(
            POOL,
            QUOTE,
            dec!(1000),
            dec!(5),
            ASSET,
            dec!(1000),
            dec!(5),
            dec!(100),
            dec!(0.003),
        )
        .with_share_balance(ACCOUNT, POOL, dec!(100));
    let config = TraderConfig::new(ACCOUNT, QUOTE);
    let orchestrator = TradingOrchestrator::new(ledger.clone(), ledger.clone(), config).unwrap();
    (ledger, orchestrator)
}

#[tokio::test]
async fn buy_authorizes_then_swaps_in_order() {
    let (ledger, orch) = setup();

    orch.buy(POOL, ASSET, dec!(10), dec!(20), None).await.unwrap();

    assert_eq!(
        ledger.issued_calls(),
        vec![
            IssuedCall::AuthorizeSpend {
                asset: QUOTE,
                spender: POOL,
                amount: dec!(20),
            },
            IssuedCall::SwapExactOut {
                pool: POOL,
                asset_in: QUOTE,
                max_amount_in: dec!(20),
                asset_out: ASSET,
                amount_out: dec!(10),
            },
        ]
    );
}

#[tokio::test]
async fn buy_over_max_in_issues_no_calls() {
    let (ledger, orch) = setup();

    // 10 out of a symmetric fee-charging pool costs ~10.13 in
    let err = orch.buy(POOL, ASSET, dec!(10), dec!(10), None).await.unwrap_err();

    assert!(matches!(err, TradeError::LimitExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn buy_beyond_reserve_ceiling_issues_no_calls() {
    let (ledger, orch) = setup();

    // Ceiling for a 1000 reserve at the default quarter fraction sits just
    // under 250
    let err = orch
        .buy(POOL, ASSET, dec!(250), dec!(10000), None)
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::ReserveCeilingExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());
}

/// Quote side weighted 1, traded side weighted 9, equal 100/100 reserves
fn skewed_setup() -> (MockLedger, TradingOrchestrator<MockLedger, MockLedger>) {
    let ledger = MockLedger::new().with_pool(
        POOL,
        QUOTE,
        dec!(100),
        dec!(1),
        ASSET,
        dec!(100),
        dec!(9),
        dec!(100),
        dec!(0.003),
    );
    let config = TraderConfig::new(ACCOUNT, QUOTE);
    let orchestrator = TradingOrchestrator::new(ledger.clone(), ledger.clone(), config).unwrap();
    (ledger, orchestrator)
}

#[tokio::test]
async fn buy_input_leg_is_held_to_the_reserve_ceiling() {
    let (ledger, orch) = skewed_setup();

    // 24 out sits under the output-side ceiling of 25, but against a
    // 1-weighted quote reserve of 100 it costs over a thousand units in
    let err = orch
        .buy(POOL, ASSET, dec!(24), dec!(2000), None)
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::ReserveCeilingExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn sell_output_leg_is_held_to_the_reserve_ceiling() {
    let (ledger, orch) = skewed_setup();

    // Selling 24 of the 9-weighted asset would pull ~85 of the 100 quote
    // reserve out
    let err = orch
        .sell(POOL, ASSET, dec!(24), dec!(1), None)
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::ReserveCeilingExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn off_convention_weight_rejects_before_any_call() {
    let ledger = MockLedger::new().with_pool(
        POOL,
        QUOTE,
        dec!(1000),
        dec!(12),
        ASSET,
        dec!(1000),
        dec!(5),
        dec!(100),
        dec!(0.003),
    );
    let config = TraderConfig::new(ACCOUNT, QUOTE);
    let orch = TradingOrchestrator::new(ledger.clone(), ledger.clone(), config).unwrap();

    let err = orch.buy(POOL, ASSET, dec!(10), dec!(20), None).await.unwrap_err();

    assert!(matches!(err, TradeError::InvalidParameter { name: "weight", .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn buy_max_price_binds_on_effective_price() {
    let (ledger, orch) = setup();

    // Effective price is ~1.013 quote per asset; a parity bound must reject
    let err = orch
        .buy(POOL, ASSET, dec!(10), dec!(20), Some(dec!(1)))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::LimitExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());

    // A looser bound passes
    orch.buy(POOL, ASSET, dec!(10), dec!(20), Some(dec!(1.1)))
        .await
        .unwrap();
    assert_eq!(ledger.issued_calls().len(), 2);
}

#[tokio::test]
async fn sell_checks_min_out_before_any_call() {
    let (ledger, orch) = setup();

    // Selling 10 yields ~9.87 after fee and slippage
    let err = orch
        .sell(POOL, ASSET, dec!(10), dec!(20), None)
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::LimitExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());

    orch.sell(POOL, ASSET, dec!(10), dec!(9), None).await.unwrap();
    assert_eq!(
        ledger.issued_calls(),
        vec![
            IssuedCall::AuthorizeSpend {
                asset: ASSET,
                spender: POOL,
                amount: dec!(10),
            },
            IssuedCall::SwapExactIn {
                pool: POOL,
                asset_in: ASSET,
                amount_in: dec!(10),
                asset_out: QUOTE,
                min_amount_out: dec!(9),
            },
        ]
    );
}

#[tokio::test]
async fn join_respects_deposit_ceiling() {
    let (ledger, orch) = setup();

    let err = orch
        .add_liquidity_single(POOL, ASSET, dec!(300))
        .await
        .unwrap_err();
    assert!(matches!(err, TradeError::ReserveCeilingExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());

    orch.add_liquidity_single(POOL, ASSET, dec!(50)).await.unwrap();
    assert_eq!(
        ledger.issued_calls(),
        vec![
            IssuedCall::AuthorizeSpend {
                asset: ASSET,
                spender: POOL,
                amount: dec!(50),
            },
            IssuedCall::JoinSingleAsset {
                pool: POOL,
                asset: ASSET,
                amount: dec!(50),
                min_shares_out: dec!(0),
            },
        ]
    );
}

#[tokio::test]
async fn withdrawal_over_ceiling_issues_no_calls() {
    let (ledger, orch) = setup();

    let err = orch
        .remove_liquidity_single(POOL, ASSET, dec!(300), dec!(50))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::ReserveCeilingExceeded { .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn exact_boundary_single_exit_applies_epsilon() {
    let (ledger, orch) = setup();

    // Ask for exactly the shares the withdrawal requires as the ceiling
    let required = WeightedMath::pool_in_given_single_out(
        dec!(1000),
        dec!(5),
        dec!(100),
        dec!(10),
        dec!(50),
        dec!(0.003),
    )
    .unwrap();

    orch.remove_liquidity_single(POOL, ASSET, dec!(50), required)
        .await
        .unwrap();

    assert_eq!(
        ledger.issued_calls(),
        vec![IssuedCall::ExitSingleAsset {
            pool: POOL,
            asset: ASSET,
            amount: dec!(50),
            max_shares_in: required * dec!(0.9999),
        }]
    );
}

#[tokio::test]
async fn comfortable_single_exit_passes_ceiling_through() {
    let (ledger, orch) = setup();

    orch.remove_liquidity_single(POOL, ASSET, dec!(50), dec!(40))
        .await
        .unwrap();

    match &ledger.issued_calls()[..] {
        [IssuedCall::ExitSingleAsset { max_shares_in, .. }] => {
            assert_eq!(*max_shares_in, dec!(40));
        }
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn single_exit_needs_funded_share_ceiling() {
    let (ledger, orch) = setup();

    // Balance is 100; a declared ceiling above it is rejected up front
    let err = orch
        .remove_liquidity_single(POOL, ASSET, dec!(50), dec!(150))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::InsufficientShares { .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn full_balance_exit_applies_epsilon_and_never_overspends() {
    let (ledger, orch) = setup();

    orch.remove_all_liquidity(POOL, dec!(100), dec!(1), dec!(2))
        .await
        .unwrap();

    assert_eq!(
        ledger.issued_calls(),
        vec![IssuedCall::ExitPool {
            pool: POOL,
            share_amount: dec!(99.99),
            min_amounts_out: [dec!(1), dec!(2)],
        }]
    );
}

#[tokio::test]
async fn partial_exit_spends_exactly_what_was_asked() {
    let (ledger, orch) = setup();

    orch.remove_all_liquidity(POOL, dec!(40), dec!(0), dec!(0))
        .await
        .unwrap();

    match &ledger.issued_calls()[..] {
        [IssuedCall::ExitPool { share_amount, .. }] => assert_eq!(*share_amount, dec!(40)),
        other => panic!("unexpected calls: {other:?}"),
    }
}

#[tokio::test]
async fn exit_above_balance_is_rejected() {
    let (ledger, orch) = setup();

    let err = orch
        .remove_all_liquidity(POOL, dec!(101), dec!(0), dec!(0))
        .await
        .unwrap_err();

    assert!(matches!(err, TradeError::InsufficientShares { .. }));
    assert!(ledger.issued_calls().is_empty());
}

#[tokio::test]
async fn collaborator_failure_surfaces_verbatim_without_retry() {
    let (ledger, orch) = setup();
    ledger.fail_action("swap_exact_out");

    let err = orch.buy(POOL, ASSET, dec!(10), dec!(20), None).await.unwrap_err();

    match err {
        TradeError::Collaborator(inner) => {
            assert_eq!(inner.action, "swap_exact_out");
            assert!(inner.detail.contains("injected failure"));
        }
        other => panic!("expected collaborator failure, got {other:?}"),
    }
    // Authorization went out, the swap was attempted exactly once, nothing
    // compensating followed
    assert_eq!(ledger.issued_calls().len(), 2);
}

#[tokio::test]
async fn failed_authorization_aborts_before_the_swap() {
    let (ledger, orch) = setup();
    ledger.fail_action("authorize_spend");

    let err = orch.buy(POOL, ASSET, dec!(10), dec!(20), None).await.unwrap_err();

    assert!(matches!(err, TradeError::Collaborator(_)));
    assert_eq!(ledger.issued_calls().len(), 1);
}

#[tokio::test]
async fn quotes_match_the_math_core() {
    let (_ledger, orch) = setup();

    let quoted = orch.quote_buy(POOL, ASSET, dec!(10)).await.unwrap();
    let expected = WeightedMath::in_given_out(
        dec!(1000),
        dec!(5),
        dec!(1000),
        dec!(5),
        dec!(10),
        dec!(0.003),
    )
    .unwrap();
    assert_eq!(quoted, expected);

    let quoted = orch.quote_sell(POOL, ASSET, dec!(10)).await.unwrap();
    let expected = WeightedMath::out_given_in(
        dec!(1000),
        dec!(5),
        dec!(1000),
        dec!(5),
        dec!(10),
        dec!(0.003),
    )
    .unwrap();
    assert_eq!(quoted, expected);
}
