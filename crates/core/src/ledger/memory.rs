//! In-memory store used by the service tests.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{NaiveDate, Utc};
use tally_shared::types::{AccountId, CompanyId, JournalEntryId, JournalLineId};

use super::balance::{AccountTotals, group_totals};
use super::error::LedgerError;
use super::numbering::EntryNumber;
use super::store::{JournalStore, PostingQueries};
use super::types::{
    DateRange, EntryStatus, JournalEntry, JournalLine, NewJournalEntry, NewJournalLine, PostedLine,
};
use super::view::sort_posted_lines;
use crate::accounts::{Account, AccountRegistry, AccountType};

#[derive(Default)]
struct MemoryState {
    accounts: HashMap<AccountId, Account>,
    entries: HashMap<JournalEntryId, JournalEntry>,
    counters: HashMap<(CompanyId, NaiveDate), u32>,
}

impl MemoryState {
    fn number_taken(&self, company_id: CompanyId, number: &str) -> bool {
        self.entries
            .values()
            .any(|e| e.company_id == company_id && e.entry_number == number)
    }

    fn current_sequence(&self, company_id: CompanyId, date: NaiveDate) -> u32 {
        self.counters.get(&(company_id, date)).copied().unwrap_or_else(|| {
            let prefix = EntryNumber::day_prefix(date);
            let count = self
                .entries
                .values()
                .filter(|e| e.company_id == company_id && e.entry_number.starts_with(&prefix))
                .count();
            u32::try_from(count).unwrap_or(u32::MAX)
        })
    }

    fn posted_lines(&self) -> impl Iterator<Item = (&JournalEntry, &JournalLine)> {
        self.entries
            .values()
            .filter(|e| e.status == EntryStatus::Posted)
            .flat_map(|e| e.lines.iter().map(move |l| (e, l)))
    }
}

fn build_lines(entry_id: JournalEntryId, lines: &[NewJournalLine]) -> Vec<JournalLine> {
    lines
        .iter()
        .zip(1u32..)
        .map(|(line, line_no)| JournalLine {
            id: JournalLineId::new(),
            entry_id,
            line_no,
            account_id: line.account_id,
            debit: line.debit,
            credit: line.credit,
            description: line.description.clone(),
        })
        .collect()
}

/// Mutex-guarded store implementing every ledger seam.
#[derive(Default)]
pub struct MemoryLedger {
    state: Mutex<MemoryState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, company_id: CompanyId, code: &str, account_type: AccountType) -> Account {
        let now = Utc::now();
        let account = Account {
            id: AccountId::new(),
            company_id,
            code: code.to_string(),
            name: format!("Account {code}"),
            localized_name: None,
            account_type,
            is_vat_account: false,
            is_system_account: false,
            is_active: true,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(account.id, account.clone());
        account
    }

    pub fn archive(&self, id: AccountId) {
        if let Some(account) = self.state.lock().unwrap().accounts.get_mut(&id) {
            account.is_archived = true;
            account.is_active = false;
        }
    }

    pub fn entry_count(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }
}

impl AccountRegistry for MemoryLedger {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, LedgerError> {
        Ok(self.state.lock().unwrap().accounts.get(&id).cloned())
    }

    async fn find_account_by_code(
        &self,
        company_id: CompanyId,
        code: &str,
    ) -> Result<Option<Account>, LedgerError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .values()
            .find(|a| a.company_id == company_id && a.code == code)
            .cloned())
    }

    async fn list_accounts(&self, company_id: CompanyId) -> Result<Vec<Account>, LedgerError> {
        let mut accounts: Vec<Account> = self
            .state
            .lock()
            .unwrap()
            .accounts
            .values()
            .filter(|a| a.company_id == company_id)
            .cloned()
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(accounts)
    }

    async fn accounts_by_ids(
        &self,
        ids: &[AccountId],
    ) -> Result<HashMap<AccountId, Account>, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| state.accounts.get(id).map(|a| (*id, a.clone())))
            .collect())
    }
}

impl JournalStore for MemoryLedger {
    async fn create_entry(&self, entry: &NewJournalEntry) -> Result<JournalEntry, LedgerError> {
        let mut state = self.state.lock().unwrap();

        let entry_number = match &entry.entry_number {
            Some(number) => {
                if state.number_taken(entry.company_id, number) {
                    return Err(LedgerError::DuplicateEntryNumber(number.clone()));
                }
                number.clone()
            }
            None => {
                let mut sequence = state.current_sequence(entry.company_id, entry.date);
                loop {
                    sequence += 1;
                    let candidate = EntryNumber::new(entry.date, sequence).to_string();
                    if !state.number_taken(entry.company_id, &candidate) {
                        state
                            .counters
                            .insert((entry.company_id, entry.date), sequence);
                        break candidate;
                    }
                }
            }
        };

        let id = JournalEntryId::new();
        let now = Utc::now();
        let stored = JournalEntry {
            id,
            company_id: entry.company_id,
            entry_number,
            date: entry.date,
            memo: entry.memo.clone(),
            source: entry.source,
            status: entry.status,
            created_by: entry.created_by,
            created_at: now,
            updated_at: now,
            lines: build_lines(id, &entry.lines),
        };
        state.entries.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_entry(&self, id: JournalEntryId) -> Result<Option<JournalEntry>, LedgerError> {
        Ok(self.state.lock().unwrap().entries.get(&id).cloned())
    }

    async fn update_draft(
        &self,
        id: JournalEntryId,
        date: NaiveDate,
        memo: Option<String>,
        lines: Option<&[NewJournalLine]>,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get_mut(&id)
            .filter(|e| e.status == EntryStatus::Draft)
            .ok_or(LedgerError::ConcurrentModification(id))?;

        entry.date = date;
        entry.memo = memo;
        if let Some(lines) = lines {
            entry.lines = build_lines(id, lines);
        }
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn delete_draft(&self, id: JournalEntryId) -> Result<(), LedgerError> {
        let mut state = self.state.lock().unwrap();
        match state.entries.get(&id) {
            Some(e) if e.status == EntryStatus::Draft => {
                state.entries.remove(&id);
                Ok(())
            }
            _ => Err(LedgerError::ConcurrentModification(id)),
        }
    }

    async fn transition_status(
        &self,
        id: JournalEntryId,
        from: EntryStatus,
        to: EntryStatus,
    ) -> Result<JournalEntry, LedgerError> {
        let mut state = self.state.lock().unwrap();
        let entry = state
            .entries
            .get_mut(&id)
            .filter(|e| e.status == from)
            .ok_or(LedgerError::ConcurrentModification(id))?;
        entry.status = to;
        entry.updated_at = Utc::now();
        Ok(entry.clone())
    }

    async fn peek_entry_number(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<String, LedgerError> {
        let state = self.state.lock().unwrap();
        let sequence = state.current_sequence(company_id, date) + 1;
        Ok(EntryNumber::new(date, sequence).to_string())
    }
}

impl PostingQueries for MemoryLedger {
    async fn account_totals(
        &self,
        company_id: CompanyId,
        range: DateRange,
    ) -> Result<Vec<AccountTotals>, LedgerError> {
        let state = self.state.lock().unwrap();
        Ok(group_totals(
            state
                .posted_lines()
                .filter(|(e, _)| e.company_id == company_id && range.contains(e.date))
                .map(|(_, l)| (l.account_id, l.debit, l.credit)),
        ))
    }

    async fn totals_before(
        &self,
        account_id: AccountId,
        before: NaiveDate,
    ) -> Result<AccountTotals, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut totals = AccountTotals::zero(account_id);
        for (_, line) in state
            .posted_lines()
            .filter(|(e, l)| l.account_id == account_id && e.date < before)
        {
            totals.add(line.debit, line.credit);
        }
        Ok(totals)
    }

    async fn posted_lines(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<Vec<PostedLine>, LedgerError> {
        let state = self.state.lock().unwrap();
        let mut lines: Vec<PostedLine> = state
            .posted_lines()
            .filter(|(e, l)| l.account_id == account_id && range.contains(e.date))
            .map(|(e, l)| PostedLine {
                line_id: l.id,
                entry_id: e.id,
                entry_number: e.entry_number.clone(),
                date: e.date,
                memo: e.memo.clone(),
                description: l.description.clone(),
                line_no: l.line_no,
                debit: l.debit,
                credit: l.credit,
            })
            .collect();
        sort_posted_lines(&mut lines);
        Ok(lines)
    }
}
