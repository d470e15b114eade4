//! `SeaORM` Entity for journal_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use tally_core::ledger::{JournalEntry, JournalLine};
use tally_shared::types::{CompanyId, JournalEntryId, UserId};

use super::sea_orm_active_enums::{EntrySource, EntryStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "journal_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub entry_number: String,
    pub entry_date: Date,
    #[sea_orm(column_type = "Text", nullable)]
    pub memo: Option<String>,
    pub source: EntrySource,
    pub status: EntryStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::companies::Entity",
        from = "Column::CompanyId",
        to = "super::companies::Column::Id",
        on_delete = "Cascade"
    )]
    Companies,
    #[sea_orm(has_many = "super::journal_lines::Entity")]
    JournalLines,
}

impl Related<super::companies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Companies.def()
    }
}

impl Related<super::journal_lines::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::JournalLines.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Converts the header and its lines into the domain entry.
    ///
    /// Lines are sorted by `line_no`.
    #[must_use]
    pub fn into_entry(self, lines: Vec<super::journal_lines::Model>) -> JournalEntry {
        let mut lines: Vec<JournalLine> = lines.into_iter().map(JournalLine::from).collect();
        lines.sort_by_key(|line| line.line_no);

        JournalEntry {
            id: JournalEntryId::from_uuid(self.id),
            company_id: CompanyId::from_uuid(self.company_id),
            entry_number: self.entry_number,
            date: self.entry_date,
            memo: self.memo,
            source: self.source.into(),
            status: self.status.into(),
            created_by: self.created_by.map(UserId::from_uuid),
            created_at: self.created_at.to_utc(),
            updated_at: self.updated_at.to_utc(),
            lines,
        }
    }
}
