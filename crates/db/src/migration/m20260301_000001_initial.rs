//! Initial database migration.
//!
//! Creates the enums, the clients/accounts/movements tables, their indexes and
//! the triggers that keep movements append-only and opening balances fixed.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: TABLES
        // ============================================================
        db.execute_unprepared(CLIENTS_SQL).await?;
        db.execute_unprepared(ACCOUNTS_SQL).await?;
        db.execute_unprepared(MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 3: TRIGGERS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE account_type AS ENUM ('savings', 'checking');
CREATE TYPE movement_kind AS ENUM ('debit', 'credit');
";

const CLIENTS_SQL: &str = r"
CREATE TABLE clients (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    gender VARCHAR(1) NOT NULL,
    age SMALLINT NOT NULL,
    identification VARCHAR(20) NOT NULL,
    address VARCHAR(200) NOT NULL DEFAULT '',
    phone VARCHAR(20) NOT NULL DEFAULT '',
    password_hash TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_clients_identification UNIQUE (identification),
    CONSTRAINT chk_clients_age CHECK (age BETWEEN 0 AND 110),
    CONSTRAINT chk_clients_name CHECK (length(trim(name)) > 0)
);

CREATE INDEX idx_clients_active_name ON clients(is_active DESC, name);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id BIGSERIAL PRIMARY KEY,
    number INTEGER NOT NULL,
    client_id BIGINT NOT NULL REFERENCES clients(id),
    account_type account_type NOT NULL,
    opening_balance NUMERIC(18, 2) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT TRUE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_accounts_number UNIQUE (number),
    CONSTRAINT chk_accounts_number CHECK (number BETWEEN 100000 AND 999999),
    CONSTRAINT chk_accounts_opening_balance CHECK (opening_balance >= 0)
);

CREATE INDEX idx_accounts_client ON accounts(client_id);
";

const MOVEMENTS_SQL: &str = r"
CREATE TABLE movements (
    id BIGSERIAL PRIMARY KEY,
    account_id BIGINT NOT NULL REFERENCES accounts(id),
    kind movement_kind NOT NULL,
    amount NUMERIC(18, 2) NOT NULL,
    balance NUMERIC(18, 2) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_movements_sign CHECK (
        (kind = 'debit' AND amount < 0) OR (kind = 'credit' AND amount > 0)
    ),
    CONSTRAINT chk_movements_balance CHECK (balance >= 0)
);

-- Latest movement lookup and daily debit sums
CREATE INDEX idx_movements_account_time ON movements(account_id, created_at DESC, id DESC);

-- Date filters on listing
CREATE INDEX idx_movements_created ON movements(created_at);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: prevent_movement_modification
-- Movements are append-only
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_movement_modification()
RETURNS TRIGGER AS $$
BEGIN
    RAISE EXCEPTION 'Movements are immutable. Post a compensating movement instead.';
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_movement_mod
BEFORE UPDATE OR DELETE ON movements
FOR EACH ROW
EXECUTE FUNCTION prevent_movement_modification();

-- ============================================================
-- FUNCTION: prevent_opening_balance_change
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_opening_balance_change()
RETURNS TRIGGER AS $$
BEGIN
    IF NEW.opening_balance <> OLD.opening_balance THEN
        RAISE EXCEPTION 'Opening balance of account % cannot change', OLD.number;
    END IF;
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_opening_balance_change
BEFORE UPDATE ON accounts
FOR EACH ROW
EXECUTE FUNCTION prevent_opening_balance_change();
";

const DROP_ALL_SQL: &str = r"
DROP TRIGGER IF EXISTS trg_prevent_opening_balance_change ON accounts;
DROP TRIGGER IF EXISTS trg_prevent_movement_mod ON movements;
DROP FUNCTION IF EXISTS prevent_opening_balance_change();
DROP FUNCTION IF EXISTS prevent_movement_modification();
DROP TABLE IF EXISTS movements CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS clients CASCADE;
DROP TYPE IF EXISTS movement_kind;
DROP TYPE IF EXISTS account_type;
";
