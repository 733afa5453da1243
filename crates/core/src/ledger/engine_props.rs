//! Property and concurrency tests for the posting engine.
//!
//! - Any sequence of postings leaves a chain that audits clean.
//! - Rejected postings leave the ledger untouched.
//! - Concurrent postings on one account serialize.

use std::sync::Arc;

use bankdesk_shared::types::{AccountNumber, ClientId};
use chrono::{TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::balance::verify_chain;
use super::clock::ManualClock;
use super::engine::{PostingEngine, PostingRules};
use super::error::LedgerError;
use super::memory::InMemoryLedger;

fn account() -> AccountNumber {
    AccountNumber::new(478_758).unwrap()
}

/// Strategy to generate posting amounts (0.01 to 800.00).
fn posting_amount() -> impl Strategy<Value = Decimal> {
    (1i64..80_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy to generate a posting: kind, amount and minutes to advance the clock.
fn posting() -> impl Strategy<Value = (&'static str, Decimal, i64)> {
    (
        prop_oneof![Just("debit"), Just("credit"), Just("DEBIT"), Just("Credit")],
        posting_amount(),
        0i64..600i64,
    )
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After any sequence of postings, accepted or not, the ledger audits
    /// clean, the balance never went negative and each rejection left the
    /// ledger exactly as it was.
    #[test]
    fn prop_chain_invariant_holds(
        opening in (0i64..200_000i64).prop_map(|cents| Decimal::new(cents, 2)),
        postings in prop::collection::vec(posting(), 1..40),
    ) {
        runtime().block_on(async {
            let ledger = InMemoryLedger::new();
            ledger.open_account(account(), ClientId::new(1), opening).unwrap();
            let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 10, 8, 0, 0).unwrap()));
            let engine = PostingEngine::new(ledger.clone(), PostingRules::new(dec!(1000), Tz::UTC))
                .with_clock(clock.clone());

            for (kind, amount, minutes) in postings {
                clock.advance(TimeDelta::minutes(minutes));
                let before = ledger.movements(account());
                match engine.post(account(), kind, amount).await {
                    Ok(movement) => {
                        prop_assert!(movement.balance >= Decimal::ZERO);
                        prop_assert_eq!(ledger.movements(account()).len(), before.len() + 1);
                    }
                    Err(err) => {
                        prop_assert!(matches!(
                            err,
                            LedgerError::InsufficientFunds { .. } | LedgerError::DailyLimitExceeded { .. }
                        ), "unexpected posting error");
                        prop_assert_eq!(ledger.movements(account()), before);
                    }
                }
            }

            let movements = ledger.movements(account());
            let final_balance = verify_chain(opening, &movements);
            prop_assert!(final_balance.is_ok());
            prop_assert_eq!(final_balance.ok(), Some(engine.current_balance(account()).await.unwrap()));
            Ok(())
        })?;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_debits_drain_to_zero() {
    const N: usize = 25;
    let amount = dec!(40);
    let opening = amount * Decimal::from(N);

    let ledger = InMemoryLedger::new();
    ledger.open_account(account(), ClientId::new(1), opening).unwrap();
    let engine = Arc::new(PostingEngine::new(
        ledger.clone(),
        PostingRules::new(dec!(1000000), Tz::UTC),
    ));

    let handles: Vec<_> = (0..=N)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.post(account(), "debit", amount).await })
        })
        .collect();
    let results: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let accepted = results.iter().filter(|r| r.is_ok()).count();
    let rejected: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
    assert_eq!(accepted, N);
    assert_eq!(rejected.len(), 1);
    assert!(matches!(rejected[0], LedgerError::InsufficientFunds { .. }));

    let movements = ledger.movements(account());
    assert_eq!(movements.len(), N);
    assert_eq!(verify_chain(opening, &movements), Ok(Decimal::ZERO));
    assert_eq!(engine.current_balance(account()).await.unwrap(), Decimal::ZERO);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_debits_respect_daily_limit() {
    let ledger = InMemoryLedger::new();
    ledger.open_account(account(), ClientId::new(1), dec!(10000)).unwrap();
    let engine = Arc::new(PostingEngine::new(
        ledger.clone(),
        PostingRules::new(dec!(1000), Tz::UTC),
    ));

    let handles: Vec<_> = (0..12)
        .map(|_| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.post(account(), "debit", dec!(200)).await })
        })
        .collect();
    let results = futures::future::join_all(handles).await;

    let accepted = results
        .iter()
        .filter(|joined| matches!(joined, Ok(Ok(_))))
        .count();
    assert_eq!(accepted, 5);
    assert_eq!(engine.debited_today(account()).await.unwrap(), dec!(1000));
    assert_eq!(
        verify_chain(dec!(10000), &ledger.movements(account())),
        Ok(dec!(9000))
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_postings_on_different_accounts_are_independent() {
    let ledger = InMemoryLedger::new();
    let numbers: Vec<AccountNumber> = (0..4)
        .map(|i| AccountNumber::new(200_000 + i).unwrap())
        .collect();
    for number in &numbers {
        ledger.open_account(*number, ClientId::new(1), dec!(500)).unwrap();
    }
    let engine = Arc::new(PostingEngine::new(
        ledger.clone(),
        PostingRules::new(dec!(1000), Tz::UTC),
    ));

    let handles: Vec<_> = numbers
        .iter()
        .flat_map(|number| {
            (0..10).map(move |i| (*number, if i % 2 == 0 { "credit" } else { "debit" }))
        })
        .map(|(number, kind)| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move { engine.post(number, kind, dec!(25)).await })
        })
        .collect();
    for joined in futures::future::join_all(handles).await {
        joined.unwrap().unwrap();
    }

    for number in numbers {
        let movements = ledger.movements(number);
        assert_eq!(movements.len(), 10);
        assert_eq!(verify_chain(dec!(500), &movements), Ok(dec!(500)));
    }
}
