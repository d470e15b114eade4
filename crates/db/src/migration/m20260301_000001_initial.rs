//! Initial database migration.
//!
//! Creates the ledger schema: enums, companies, chart of accounts, journal
//! entries and lines, the per-day entry number counters and the integrity
//! triggers that back the application-level checks.

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
        // PART 2: COMPANIES
        // ============================================================
        db.execute_unprepared(COMPANIES_SQL).await?;

        // ============================================================
        // PART 3: CHART OF ACCOUNTS
        // ============================================================
        db.execute_unprepared(ACCOUNTS_SQL).await?;

        // ============================================================
        // PART 4: JOURNAL
        // ============================================================
        db.execute_unprepared(JOURNAL_ENTRIES_SQL).await?;
        db.execute_unprepared(JOURNAL_LINES_SQL).await?;
        db.execute_unprepared(ENTRY_NUMBER_SEQUENCES_SQL).await?;

        // ============================================================
        // PART 5: TRIGGERS
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
-- Account classification, decides the normal balance side
CREATE TYPE account_type AS ENUM (
    'asset',
    'liability',
    'equity',
    'income',
    'expense'
);

-- Journal entry lifecycle: draft -> posted -> void
CREATE TYPE entry_status AS ENUM ('draft', 'posted', 'void');

-- Where a journal entry came from
CREATE TYPE entry_source AS ENUM ('manual', 'invoice', 'receipt', 'import');
";

const COMPANIES_SQL: &str = r"
CREATE TABLE companies (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const ACCOUNTS_SQL: &str = r"
CREATE TABLE accounts (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    code VARCHAR(20) NOT NULL,
    name VARCHAR(255) NOT NULL,
    localized_name VARCHAR(255),
    account_type account_type NOT NULL,
    is_vat_account BOOLEAN NOT NULL DEFAULT false,
    is_system_account BOOLEAN NOT NULL DEFAULT false,
    is_active BOOLEAN NOT NULL DEFAULT true,
    is_archived BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_accounts_company_code UNIQUE (company_id, code)
);

CREATE INDEX idx_accounts_company ON accounts(company_id) WHERE is_archived = false;
CREATE INDEX idx_accounts_type ON accounts(company_id, account_type);
";

const JOURNAL_ENTRIES_SQL: &str = r"
CREATE TABLE journal_entries (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    entry_number VARCHAR(32) NOT NULL,
    entry_date DATE NOT NULL,
    memo TEXT,
    source entry_source NOT NULL DEFAULT 'manual',
    status entry_status NOT NULL DEFAULT 'draft',
    created_by UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_journal_entries_number UNIQUE (company_id, entry_number)
);

CREATE INDEX idx_journal_entries_posted ON journal_entries(company_id, entry_date)
    WHERE status = 'posted';
CREATE INDEX idx_journal_entries_status ON journal_entries(company_id, status);
";

const JOURNAL_LINES_SQL: &str = r"
CREATE TABLE journal_lines (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    entry_id UUID NOT NULL REFERENCES journal_entries(id) ON DELETE CASCADE,
    line_no INTEGER NOT NULL CHECK (line_no > 0),
    account_id UUID NOT NULL REFERENCES accounts(id) ON DELETE RESTRICT,
    debit NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (debit >= 0),
    credit NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (credit >= 0),
    description TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_one_side CHECK (NOT (debit > 0 AND credit > 0)),
    CONSTRAINT uq_journal_lines_position UNIQUE (entry_id, line_no)
);

CREATE INDEX idx_journal_lines_account ON journal_lines(account_id);
";

const ENTRY_NUMBER_SEQUENCES_SQL: &str = r"
-- One counter per company and entry date. Bumped with
-- INSERT ... ON CONFLICT DO UPDATE ... RETURNING in the entry's transaction.
CREATE TABLE entry_number_sequences (
    company_id UUID NOT NULL REFERENCES companies(id) ON DELETE CASCADE,
    entry_date DATE NOT NULL,
    last_value INTEGER NOT NULL CHECK (last_value >= 0),
    PRIMARY KEY (company_id, entry_date)
);
";

const TRIGGERS_SQL: &str = r"
-- ============================================================
-- FUNCTION: check_entry_balance
-- Posted entries must have lines whose debits and credits agree
-- within 0.01. Checked at commit so header and lines can be written
-- in any order inside one transaction.
-- ============================================================
CREATE OR REPLACE FUNCTION check_entry_balance()
RETURNS TRIGGER AS $$
DECLARE
    target_entry UUID;
    current_status entry_status;
    total_debit NUMERIC(19, 4);
    total_credit NUMERIC(19, 4);
    line_count INTEGER;
BEGIN
    IF TG_TABLE_NAME = 'journal_entries' THEN
        target_entry := NEW.id;
    ELSIF TG_OP = 'DELETE' THEN
        target_entry := OLD.entry_id;
    ELSE
        target_entry := NEW.entry_id;
    END IF;

    SELECT status INTO current_status
    FROM journal_entries
    WHERE id = target_entry;

    IF current_status = 'posted' THEN
        SELECT
            COALESCE(SUM(debit), 0),
            COALESCE(SUM(credit), 0),
            COUNT(*)
        INTO total_debit, total_credit, line_count
        FROM journal_lines
        WHERE entry_id = target_entry;

        IF line_count = 0 THEN
            RAISE EXCEPTION 'Posted journal entry % has no lines', target_entry;
        END IF;

        IF ABS(total_debit - total_credit) > 0.01 THEN
            RAISE EXCEPTION 'Journal entry is not balanced. Debit: %, Credit: %',
                total_debit, total_credit;
        END IF;
    END IF;

    RETURN NULL;
END;
$$ LANGUAGE plpgsql;

CREATE CONSTRAINT TRIGGER trg_check_balance_lines
AFTER INSERT OR UPDATE OR DELETE ON journal_lines
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_entry_balance();

CREATE CONSTRAINT TRIGGER trg_check_balance_entries
AFTER INSERT OR UPDATE OF status ON journal_entries
DEFERRABLE INITIALLY DEFERRED
FOR EACH ROW
EXECUTE FUNCTION check_entry_balance();

-- ============================================================
-- FUNCTION: prevent_posted_modification
-- Only drafts may be edited or deleted; a posted entry may only be voided.
-- ============================================================
CREATE OR REPLACE FUNCTION prevent_posted_modification()
RETURNS TRIGGER AS $$
BEGIN
    IF TG_OP = 'DELETE' THEN
        IF OLD.status <> 'draft' THEN
            RAISE EXCEPTION 'Cannot delete % journal entry. Void it instead.', OLD.status;
        END IF;
        RETURN OLD;
    END IF;

    IF OLD.status = 'posted' AND NEW.status <> 'void' THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry. Void it instead.';
    END IF;

    IF OLD.status = 'void' THEN
        RAISE EXCEPTION 'Cannot modify void journal entry.';
    END IF;

    IF OLD.status <> 'draft' AND (
        NEW.entry_number IS DISTINCT FROM OLD.entry_number
        OR NEW.entry_date IS DISTINCT FROM OLD.entry_date
        OR NEW.memo IS DISTINCT FROM OLD.memo
    ) THEN
        RAISE EXCEPTION 'Cannot modify posted journal entry. Void it instead.';
    END IF;

    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_prevent_posted_mod
BEFORE UPDATE OR DELETE ON journal_entries
FOR EACH ROW
EXECUTE FUNCTION prevent_posted_modification();
";

const DROP_ALL_SQL: &str = r"
-- ============================================================
-- DROP ALL: Rollback migration
-- Order matters due to foreign key constraints
-- ============================================================

-- Drop triggers
DROP TRIGGER IF EXISTS trg_prevent_posted_mod ON journal_entries;
DROP TRIGGER IF EXISTS trg_check_balance_entries ON journal_entries;
DROP TRIGGER IF EXISTS trg_check_balance_lines ON journal_lines;

-- Drop functions
DROP FUNCTION IF EXISTS prevent_posted_modification();
DROP FUNCTION IF EXISTS check_entry_balance();

-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS entry_number_sequences CASCADE;
DROP TABLE IF EXISTS journal_lines CASCADE;
DROP TABLE IF EXISTS journal_entries CASCADE;
DROP TABLE IF EXISTS accounts CASCADE;
DROP TABLE IF EXISTS companies CASCADE;

-- Drop enums
DROP TYPE IF EXISTS entry_source CASCADE;
DROP TYPE IF EXISTS entry_status CASCADE;
DROP TYPE IF EXISTS account_type CASCADE;
";
