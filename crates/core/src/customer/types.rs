//! Client and account domain types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::CustomerError;
use crate::ledger::{AMOUNT_SCALE, MAX_AMOUNT};

/// Maximum client age accepted.
pub const MAX_AGE: i16 = 110;

/// Kind of bank account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Savings account.
    Savings,
    /// Checking account.
    Checking,
}

impl AccountType {
    /// Parses an account type case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, CustomerError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("savings") {
            Ok(Self::Savings)
        } else if trimmed.eq_ignore_ascii_case("checking") {
            Ok(Self::Checking)
        } else {
            Err(CustomerError::InvalidAccountType(raw.to_string()))
        }
    }

    /// Canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Checking => "checking",
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything needed to register a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub gender: String,
    pub age: i16,
    pub identification: String,
    pub address: String,
    pub phone: String,
    /// Clear-text password; hashed before storage.
    pub password: String,
}

impl NewClient {
    /// Checks field ranges.
    pub fn validate(&self) -> Result<(), CustomerError> {
        ClientChanges::from(self.clone()).validate()?;
        if self.name.trim().is_empty() {
            return Err(field("name", "must not be empty"));
        }
        if self.identification.trim().is_empty() {
            return Err(field("identification", "must not be empty"));
        }
        if self.password.is_empty() {
            return Err(field("password", "must not be empty"));
        }
        Ok(())
    }
}

/// Partial update of a client. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientChanges {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub age: Option<i16>,
    pub identification: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
    pub is_active: Option<bool>,
}

impl From<NewClient> for ClientChanges {
    fn from(client: NewClient) -> Self {
        Self {
            name: Some(client.name),
            gender: Some(client.gender),
            age: Some(client.age),
            identification: Some(client.identification),
            address: Some(client.address),
            phone: Some(client.phone),
            password: Some(client.password),
            is_active: None,
        }
    }
}

impl ClientChanges {
    /// Drops blank text fields, which are treated as "not provided".
    #[must_use]
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.trim().is_empty())
        }
        Self {
            name: keep(self.name),
            gender: keep(self.gender),
            age: self.age,
            identification: keep(self.identification),
            address: keep(self.address),
            phone: keep(self.phone),
            password: keep(self.password),
            is_active: self.is_active,
        }
    }

    /// True when nothing would change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks the ranges of the provided fields.
    pub fn validate(&self) -> Result<(), CustomerError> {
        check_len("name", self.name.as_deref(), 100)?;
        check_len("identification", self.identification.as_deref(), 20)?;
        check_len("address", self.address.as_deref(), 200)?;
        check_len("phone", self.phone.as_deref(), 20)?;
        if let Some(gender) = &self.gender
            && gender.chars().count() != 1
        {
            return Err(field("gender", "must be a single character"));
        }
        if let Some(age) = self.age
            && !(0..=MAX_AGE).contains(&age)
        {
            return Err(field("age", "must be between 0 and 110"));
        }
        Ok(())
    }
}

/// Partial update of an account. The opening balance is immutable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub account_type: Option<AccountType>,
    pub is_active: Option<bool>,
}

impl AccountChanges {
    /// True if applying the changes turns an inactive account active.
    #[must_use]
    pub fn reactivates(&self, currently_active: bool) -> bool {
        !currently_active && self.is_active == Some(true)
    }
}

/// Opening balances must be non-negative, storable, with at most two decimals.
pub fn validate_opening_balance(opening_balance: Decimal) -> Result<(), CustomerError> {
    if opening_balance < Decimal::ZERO
        || opening_balance > MAX_AMOUNT
        || opening_balance.normalize().scale() > AMOUNT_SCALE
    {
        return Err(CustomerError::InvalidOpeningBalance(opening_balance));
    }
    Ok(())
}

fn check_len(name: &'static str, value: Option<&str>, max: usize) -> Result<(), CustomerError> {
    match value {
        Some(v) if v.chars().count() > max => Err(field(name, "is too long")),
        _ => Ok(()),
    }
}

const fn field(field: &'static str, reason: &'static str) -> CustomerError {
    CustomerError::InvalidField { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn jose() -> NewClient {
        NewClient {
            name: "Jose Lema".to_string(),
            gender: "M".to_string(),
            age: 35,
            identification: "1712345678".to_string(),
            address: "Otavalo sn y principal".to_string(),
            phone: "098254785".to_string(),
            password: "1234".to_string(),
        }
    }

    #[rstest]
    #[case("savings", AccountType::Savings)]
    #[case("SAVINGS", AccountType::Savings)]
    #[case("Checking", AccountType::Checking)]
    fn test_account_type_parse(#[case] raw: &str, #[case] expected: AccountType) {
        assert_eq!(AccountType::parse(raw).unwrap(), expected);
    }

    #[test]
    fn test_account_type_rejects_unknown() {
        assert_eq!(
            AccountType::parse("Ahorros"),
            Err(CustomerError::InvalidAccountType("Ahorros".to_string()))
        );
    }

    #[test]
    fn test_valid_client() {
        assert!(jose().validate().is_ok());
    }

    #[rstest]
    #[case(NewClient { age: 111, ..jose() }, "age")]
    #[case(NewClient { age: -1, ..jose() }, "age")]
    #[case(NewClient { gender: "MF".into(), ..jose() }, "gender")]
    #[case(NewClient { name: " ".into(), ..jose() }, "name")]
    #[case(NewClient { name: "x".repeat(101), ..jose() }, "name")]
    #[case(NewClient { identification: "1".repeat(21), ..jose() }, "identification")]
    #[case(NewClient { phone: "0".repeat(21), ..jose() }, "phone")]
    #[case(NewClient { password: String::new(), ..jose() }, "password")]
    fn test_invalid_client(#[case] client: NewClient, #[case] expected_field: &str) {
        match client.validate() {
            Err(CustomerError::InvalidField { field, .. }) => assert_eq!(field, expected_field),
            other => panic!("expected invalid {expected_field}, got {other:?}"),
        }
    }

    #[test]
    fn test_normalized_drops_blank_fields() {
        let changes = ClientChanges {
            name: Some(String::new()),
            address: Some("  ".to_string()),
            phone: Some("098874587".to_string()),
            age: Some(40),
            ..ClientChanges::default()
        }
        .normalized();

        assert_eq!(changes.name, None);
        assert_eq!(changes.address, None);
        assert_eq!(changes.phone.as_deref(), Some("098874587"));
        assert_eq!(changes.age, Some(40));
        assert!(!changes.is_empty());
        assert!(ClientChanges::default().is_empty());
    }

    #[test]
    fn test_reactivation_detection() {
        let reactivate = AccountChanges {
            is_active: Some(true),
            ..AccountChanges::default()
        };
        assert!(reactivate.reactivates(false));
        assert!(!reactivate.reactivates(true));
        assert!(!AccountChanges::default().reactivates(false));
    }

    #[rstest]
    #[case(dec!(0), true)]
    #[case(dec!(2000), true)]
    #[case(dec!(100.50), true)]
    #[case(dec!(-0.01), false)]
    #[case(dec!(1.005), false)]
    #[case(dec!(9999999999999999.99), true)]
    #[case(dec!(10000000000000000), false)]
    #[case(Decimal::MAX, false)]
    fn test_opening_balance(#[case] value: Decimal, #[case] ok: bool) {
        assert_eq!(validate_opening_balance(value).is_ok(), ok);
    }
}
