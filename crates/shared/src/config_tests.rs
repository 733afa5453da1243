use super::*;
use rust_decimal_macros::dec;

#[test]
fn test_business_rules_default() {
    let rules = BusinessRulesConfig::default();
    assert_eq!(rules.daily_debit_limit, dec!(1000));
    assert_eq!(rules.timezone, "UTC");
    assert!(rules.account_number_seed.is_none());
    assert!(rules.validate().is_ok());
}

#[test]
fn test_business_rules_rejects_non_positive_limit() {
    let rules = BusinessRulesConfig {
        daily_debit_limit: Decimal::ZERO,
        ..BusinessRulesConfig::default()
    };
    assert!(rules.validate().is_err());

    let rules = BusinessRulesConfig {
        daily_debit_limit: dec!(-10),
        ..BusinessRulesConfig::default()
    };
    assert!(rules.validate().is_err());
}

#[test]
fn test_business_rules_rejects_unknown_timezone() {
    let rules = BusinessRulesConfig {
        timezone: "Mars/Olympus_Mons".to_string(),
        ..BusinessRulesConfig::default()
    };
    assert!(rules.timezone().is_err());
    assert!(rules.validate().is_err());
}

#[test]
fn test_business_rules_parses_iana_timezone() {
    let rules = BusinessRulesConfig {
        timezone: "America/Guayaquil".to_string(),
        ..BusinessRulesConfig::default()
    };
    assert_eq!(rules.timezone().unwrap(), chrono_tz::America::Guayaquil);
}

#[test]
fn test_load_from_environment() {
    temp_env::with_vars(
        [
            ("BANKDESK__DATABASE__URL", Some("postgres://localhost/bankdesk_test")),
            ("BANKDESK__SERVER__PORT", Some("9090")),
            ("BANKDESK__BUSINESS_RULES__DAILY_DEBIT_LIMIT", Some("2500.50")),
            ("BANKDESK__BUSINESS_RULES__TIMEZONE", Some("America/Guayaquil")),
            ("RUN_MODE", Some("test")),
        ],
        || {
            let config = AppConfig::load().unwrap();
            assert_eq!(config.database.url, "postgres://localhost/bankdesk_test");
            assert_eq!(config.database.max_connections, 10);
            assert_eq!(config.server.host, "0.0.0.0");
            assert_eq!(config.server.port, 9090);
            assert_eq!(config.business_rules.daily_debit_limit, dec!(2500.50));
            assert_eq!(config.business_rules.timezone, "America/Guayaquil");
        },
    );
}

#[test]
fn test_load_rejects_invalid_business_rules() {
    temp_env::with_vars(
        [
            ("BANKDESK__DATABASE__URL", Some("postgres://localhost/bankdesk_test")),
            ("BANKDESK__BUSINESS_RULES__DAILY_DEBIT_LIMIT", Some("0")),
            ("RUN_MODE", Some("test")),
        ],
        || {
            assert!(AppConfig::load().is_err());
        },
    );
}
