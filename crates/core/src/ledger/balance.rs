//! Running balance resolution and ledger auditing.
//!
//! The balance of an account is never stored as a mutable column. It is the
//! snapshot carried by the latest movement, ordered by `(created_at, id)`, or
//! the opening balance when the account has no movements yet.

use bankdesk_shared::types::MovementId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{Movement, MovementKind};

/// Returns the current balance given the latest movement of an account.
#[must_use]
pub fn current_balance(opening_balance: Decimal, latest: Option<&Movement>) -> Decimal {
    latest.map_or(opening_balance, |movement| movement.balance)
}

/// Picks the latest movement by `(created_at, id)`.
pub fn latest_movement<'a, I>(movements: I) -> Option<&'a Movement>
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements
        .into_iter()
        .max_by_key(|movement| (movement.created_at, movement.id))
}

/// Balance transition produced by one movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Balance before the movement.
    pub previous_balance: Decimal,
    /// Balance after the movement.
    pub current_balance: Decimal,
}

impl RunningBalance {
    /// Applies a signed amount on top of `previous_balance`.
    ///
    /// Returns `None` if the sum overflows `Decimal`.
    #[must_use]
    pub fn next(previous_balance: Decimal, signed_amount: Decimal) -> Option<Self> {
        Some(Self {
            previous_balance,
            current_balance: previous_balance.checked_add(signed_amount)?,
        })
    }

    /// Returns true if the transition would overdraw the account.
    #[must_use]
    pub fn is_overdrawn(&self) -> bool {
        self.current_balance < Decimal::ZERO
    }
}

/// A break found while auditing a movement chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// Movements are not strictly ordered by `(created_at, id)`.
    #[error("Movement {0} is out of order")]
    OutOfOrder(MovementId),

    /// The amount sign disagrees with the movement kind.
    #[error("Movement {0} has an amount sign that does not match its kind")]
    SignMismatch(MovementId),

    /// The snapshot does not equal the previous balance plus the amount.
    #[error("Movement {movement_id} carries balance {actual}, expected {expected}")]
    SnapshotMismatch {
        /// Offending movement.
        movement_id: MovementId,
        /// Previous balance plus the movement amount.
        expected: Decimal,
        /// Snapshot found on the movement.
        actual: Decimal,
    },

    /// Previous balance plus the amount does not fit in a `Decimal`.
    #[error("Movement {0} overflows the running balance")]
    Overflow(MovementId),
}

/// Audits a movement chain and returns the final balance.
///
/// `movements` must be the complete ledger of one account in `(created_at, id)`
/// order. Each snapshot must equal the previous balance plus its signed amount,
/// starting from the opening balance.
pub fn verify_chain(opening_balance: Decimal, movements: &[Movement]) -> Result<Decimal, ChainError> {
    let mut balance = opening_balance;
    let mut previous: Option<&Movement> = None;

    for movement in movements {
        if let Some(prev) = previous
            && (prev.created_at, prev.id) >= (movement.created_at, movement.id)
        {
            return Err(ChainError::OutOfOrder(movement.id));
        }

        let sign_ok = match movement.kind {
            MovementKind::Debit => movement.amount < Decimal::ZERO,
            MovementKind::Credit => movement.amount > Decimal::ZERO,
        };
        if !sign_ok {
            return Err(ChainError::SignMismatch(movement.id));
        }

        let expected = RunningBalance::next(balance, movement.amount)
            .ok_or(ChainError::Overflow(movement.id))?
            .current_balance;
        if movement.balance != expected {
            return Err(ChainError::SnapshotMismatch {
                movement_id: movement.id,
                expected,
                actual: movement.balance,
            });
        }

        balance = expected;
        previous = Some(movement);
    }

    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bankdesk_shared::types::AccountId;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap()
    }

    /// Builds a consistent chain from signed amounts.
    fn chain(opening: Decimal, amounts: &[Decimal]) -> Vec<Movement> {
        let mut balance = opening;
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| {
                balance += *amount;
                let offset = i64::try_from(i).unwrap();
                Movement {
                    id: MovementId::new(offset + 1),
                    account_id: AccountId::new(1),
                    kind: if amount.is_sign_negative() {
                        MovementKind::Debit
                    } else {
                        MovementKind::Credit
                    },
                    amount: *amount,
                    balance,
                    created_at: t0() + Duration::seconds(offset),
                }
            })
            .collect()
    }

    #[test]
    fn test_current_balance_falls_back_to_opening() {
        assert_eq!(current_balance(dec!(2000), None), dec!(2000));
    }

    #[test]
    fn test_current_balance_uses_latest_snapshot() {
        let movements = chain(dec!(1000), &[dec!(500), dec!(-200)]);
        let latest = latest_movement(&movements);
        assert_eq!(latest.map(|m| m.id), Some(MovementId::new(2)));
        assert_eq!(current_balance(dec!(1000), latest), dec!(1300));
    }

    #[test]
    fn test_latest_breaks_timestamp_ties_by_id() {
        let mut movements = chain(dec!(0), &[dec!(10), dec!(20)]);
        movements[1].created_at = movements[0].created_at;
        movements.reverse();
        assert_eq!(
            latest_movement(&movements).map(|m| m.id),
            Some(MovementId::new(2))
        );
    }

    #[test]
    fn test_running_balance_overdraft_detection() {
        assert!(!RunningBalance::next(dec!(100), dec!(-100)).unwrap().is_overdrawn());
        assert!(RunningBalance::next(dec!(100), dec!(-100.01)).unwrap().is_overdrawn());
    }

    #[test]
    fn test_running_balance_overflow_is_none() {
        assert_eq!(RunningBalance::next(Decimal::MAX, dec!(0.01)), None);
        assert_eq!(RunningBalance::next(Decimal::MIN, dec!(-1)), None);
    }

    #[test]
    fn test_verify_chain_reports_overflow() {
        let mut movements = chain(dec!(0), &[dec!(1)]);
        movements[0].amount = Decimal::MAX;
        assert_eq!(
            verify_chain(dec!(1), &movements),
            Err(ChainError::Overflow(MovementId::new(1)))
        );
    }

    #[test]
    fn test_verify_chain_detects_tampered_snapshot() {
        let mut movements = chain(dec!(1000), &[dec!(500), dec!(-200), dec!(50)]);
        movements[1].balance = dec!(9999);
        assert_eq!(
            verify_chain(dec!(1000), &movements),
            Err(ChainError::SnapshotMismatch {
                movement_id: MovementId::new(2),
                expected: dec!(1300),
                actual: dec!(9999),
            })
        );
    }

    #[test]
    fn test_verify_chain_detects_bad_order_and_sign() {
        let mut movements = chain(dec!(1000), &[dec!(500), dec!(-200)]);
        movements.swap(0, 1);
        assert_eq!(
            verify_chain(dec!(1000), &movements),
            Err(ChainError::OutOfOrder(MovementId::new(1)))
        );

        let mut movements = chain(dec!(1000), &[dec!(500)]);
        movements[0].kind = MovementKind::Debit;
        assert_eq!(
            verify_chain(dec!(1000), &movements),
            Err(ChainError::SignMismatch(MovementId::new(1)))
        );
    }

    #[test]
    fn test_verify_empty_chain_is_opening_balance() {
        assert_eq!(verify_chain(dec!(75.50), &[]), Ok(dec!(75.50)));
    }

    /// Signed amounts between -1,000.00 and 1,000.00, never zero.
    fn signed_amount() -> impl Strategy<Value = Decimal> {
        prop_oneof![
            (1i64..100_000i64).prop_map(|cents| Decimal::new(cents, 2)),
            (1i64..100_000i64).prop_map(|cents| Decimal::new(-cents, 2)),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A chain built by applying amounts in order always audits clean and
        /// ends at opening plus the sum of amounts.
        #[test]
        fn prop_chain_ends_at_opening_plus_sum(
            opening in (0i64..1_000_000i64).prop_map(|cents| Decimal::new(cents, 2)),
            amounts in prop::collection::vec(signed_amount(), 0..30),
        ) {
            let movements = chain(opening, &amounts);
            let expected: Decimal = opening + amounts.iter().copied().sum::<Decimal>();
            prop_assert_eq!(verify_chain(opening, &movements), Ok(expected));
            prop_assert_eq!(
                current_balance(opening, latest_movement(&movements)),
                expected
            );
        }

        /// Changing any single snapshot breaks the audit at that movement.
        #[test]
        fn prop_any_tampered_snapshot_is_detected(
            amounts in prop::collection::vec(signed_amount(), 1..20),
            index in any::<prop::sample::Index>(),
            delta in signed_amount(),
        ) {
            let mut movements = chain(dec!(500), &amounts);
            let i = index.index(movements.len());
            movements[i].balance += delta;
            let is_mismatch = matches!(
                verify_chain(dec!(500), &movements),
                Err(ChainError::SnapshotMismatch { movement_id, .. }) if movement_id == movements[i].id
            );
            prop_assert!(is_mismatch);
        }
    }
}
