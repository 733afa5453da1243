//! Tests for statement aggregation.

use bankdesk_shared::types::{AccountNumber, ClientId, MovementId};
use chrono::{NaiveDate, TimeDelta, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::service::StatementBuilder;
use super::types::{StatementAccount, StatementMovement, StatementPeriod};
use crate::customer::AccountType;
use crate::ledger::BusinessDay;

fn number(value: u32) -> AccountNumber {
    AccountNumber::new(value).unwrap()
}

fn date(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, d).unwrap()
}

fn account(value: u32, account_type: AccountType, opening: Decimal) -> StatementAccount {
    StatementAccount {
        number: number(value),
        account_type,
        opening_balance: opening,
        is_active: true,
    }
}

fn movement(account: u32, id: i64, amount: Decimal, balance: Decimal, hour: u32) -> StatementMovement {
    StatementMovement {
        account_number: number(account),
        id: MovementId::new(id),
        amount,
        balance,
        created_at: Utc.with_ymd_and_hms(2026, 2, 8, hour, 0, 0).unwrap(),
    }
}

#[test]
fn test_period_rejects_reversed_range() {
    assert_eq!(
        StatementPeriod::new(date(10), date(8)),
        Err(ReportError::InvalidDateRange {
            from: date(10),
            to: date(8),
        })
    );
    assert!(StatementPeriod::new(date(8), date(8)).is_ok());
}

#[test]
fn test_period_window_is_inclusive_of_last_day() {
    let period = StatementPeriod::new(date(1), date(10)).unwrap();
    let window = period.window(&BusinessDay::default());
    assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap());
    assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 2, 11, 0, 0, 0).unwrap());

    let single = StatementPeriod::single_day(date(8)).window(&BusinessDay::default());
    assert_eq!(single.end - single.start, TimeDelta::days(1));
}

#[test]
fn test_statement_lines_per_account() {
    let accounts = vec![
        account(585_545, AccountType::Checking, dec!(1000)),
        account(478_758, AccountType::Savings, dec!(2000)),
        account(225_487, AccountType::Checking, dec!(100)),
    ];
    let movements = vec![
        movement(478_758, 1, dec!(-575), dec!(1425), 9),
        movement(585_545, 2, dec!(600), dec!(1600), 10),
        movement(478_758, 3, dec!(100), dec!(1525), 11),
    ];

    let statement = StatementBuilder::build(
        ClientId::new(1),
        "Jose Lema",
        StatementPeriod::single_day(date(8)),
        &accounts,
        &movements,
    )
    .unwrap();

    assert_eq!(statement.client_name, "Jose Lema");
    assert_eq!(statement.lines.len(), 2);

    let savings = &statement.lines[0];
    assert_eq!(savings.account_number, number(478_758));
    assert_eq!(savings.account_type, AccountType::Savings);
    assert_eq!(savings.opening_balance, dec!(2000));
    assert_eq!(savings.movement_total, dec!(-475));
    assert_eq!(savings.debit_total, dec!(575));
    assert_eq!(savings.credit_total, dec!(100));
    assert_eq!(savings.available_balance, dec!(1525));
    assert_eq!(
        savings.last_movement_at,
        Utc.with_ymd_and_hms(2026, 2, 8, 11, 0, 0).unwrap()
    );

    let checking = &statement.lines[1];
    assert_eq!(checking.account_number, number(585_545));
    assert_eq!(checking.movement_total, dec!(600));
    assert_eq!(checking.available_balance, dec!(1600));
}

#[test]
fn test_available_balance_includes_movements_before_range() {
    // The snapshot already carries the earlier history.
    let accounts = vec![account(478_758, AccountType::Savings, dec!(2000))];
    let movements = vec![movement(478_758, 9, dec!(-100), dec!(1300), 9)];

    let statement = StatementBuilder::build(
        ClientId::new(1),
        "Jose Lema",
        StatementPeriod::single_day(date(8)),
        &accounts,
        &movements,
    )
    .unwrap();

    let line = &statement.lines[0];
    assert_eq!(line.movement_total, dec!(-100));
    assert_eq!(line.available_balance, dec!(1300));
    assert_ne!(line.available_balance, line.opening_balance + line.movement_total);
}

#[test]
fn test_no_movements_is_not_found() {
    let accounts = vec![account(478_758, AccountType::Savings, dec!(2000))];
    let movements = vec![movement(999_999, 1, dec!(10), dec!(10), 9)];

    let err = StatementBuilder::build(
        ClientId::new(4),
        "Marianela Montalvo",
        StatementPeriod::single_day(date(8)),
        &accounts,
        &movements,
    )
    .unwrap_err();

    assert_eq!(err.http_status_code(), 404);
    assert!(matches!(err, ReportError::NoMovements { client_id, .. } if client_id == ClientId::new(4)));
}

proptest! {
    /// The net total always equals credits minus debits, and the available
    /// balance is the snapshot of the latest movement.
    #[test]
    fn prop_totals_are_consistent(
        amounts in prop::collection::vec(
            prop_oneof![
                (1i64..100_000i64).prop_map(|c| Decimal::new(c, 2)),
                (1i64..100_000i64).prop_map(|c| Decimal::new(-c, 2)),
            ],
            1..30,
        ),
    ) {
        let mut balance = dec!(5000);
        let movements: Vec<StatementMovement> = amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                balance += *amount;
                let id = i64::try_from(i).unwrap() + 1;
                StatementMovement {
                    account_number: number(478_758),
                    id: MovementId::new(id),
                    amount: *amount,
                    balance,
                    created_at: Utc.with_ymd_and_hms(2026, 2, 8, 12, 0, 0).unwrap(),
                }
            })
            .collect();

        let statement = StatementBuilder::build(
            ClientId::new(1),
            "Jose Lema",
            StatementPeriod::single_day(date(8)),
            &[account(478_758, AccountType::Savings, dec!(5000))],
            &movements,
        )
        .unwrap();

        let line = &statement.lines[0];
        let net: Decimal = amounts.iter().copied().sum();
        prop_assert_eq!(line.movement_total, net);
        prop_assert_eq!(line.credit_total - line.debit_total, net);
        prop_assert_eq!(line.available_balance, balance);
        prop_assert_eq!(line.available_balance, line.opening_balance + net);
    }
}
