//! Statement aggregation.
//!
//! Pure function over already-fetched rows: the `db` crate loads the
//! client's accounts and the movements inside the period window, then hands
//! them to [`StatementBuilder::build`].

use std::collections::BTreeMap;

use bankdesk_shared::types::{AccountNumber, ClientId};
use rust_decimal::Decimal;

use super::error::ReportError;
use super::types::{AccountStatement, StatementAccount, StatementLine, StatementMovement, StatementPeriod};

/// Builds account statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementBuilder;

impl StatementBuilder {
    /// Aggregates movements per account.
    ///
    /// Accounts without movements in `movements` are left out. Movements of
    /// accounts not listed in `accounts` are ignored. Fails with
    /// [`ReportError::NoMovements`] when no line remains.
    pub fn build(
        client_id: ClientId,
        client_name: &str,
        period: StatementPeriod,
        accounts: &[StatementAccount],
        movements: &[StatementMovement],
    ) -> Result<AccountStatement, ReportError> {
        let mut by_account: BTreeMap<AccountNumber, Vec<&StatementMovement>> = BTreeMap::new();
        for movement in movements {
            by_account.entry(movement.account_number).or_default().push(movement);
        }

        let mut accounts: Vec<&StatementAccount> = accounts.iter().collect();
        accounts.sort_by_key(|account| account.number);

        let lines: Vec<StatementLine> = accounts
            .into_iter()
            .filter_map(|account| {
                let movements = by_account.get(&account.number)?;
                Self::line(client_name, account, movements)
            })
            .collect();

        if lines.is_empty() {
            return Err(ReportError::NoMovements {
                client_id,
                from: period.from,
                to: period.to,
            });
        }

        Ok(AccountStatement {
            client_id,
            client_name: client_name.to_string(),
            period,
            lines,
        })
    }

    fn line(
        client_name: &str,
        account: &StatementAccount,
        movements: &[&StatementMovement],
    ) -> Option<StatementLine> {
        let last = movements
            .iter()
            .max_by_key(|movement| (movement.created_at, movement.id))?;

        let (debit_total, credit_total) =
            movements
                .iter()
                .fold((Decimal::ZERO, Decimal::ZERO), |(debits, credits), movement| {
                    if movement.amount.is_sign_negative() {
                        (debits + movement.amount.abs(), credits)
                    } else {
                        (debits, credits + movement.amount)
                    }
                });

        Some(StatementLine {
            last_movement_at: last.created_at,
            client_name: client_name.to_string(),
            account_number: account.number,
            account_type: account.account_type,
            opening_balance: account.opening_balance,
            is_active: account.is_active,
            movement_total: credit_total - debit_total,
            debit_total,
            credit_total,
            available_balance: last.balance,
        })
    }
}
