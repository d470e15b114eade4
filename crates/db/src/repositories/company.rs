//! Company repository for database operations.

use sea_orm::{ActiveModelTrait, DatabaseConnection, DbErr, EntityTrait, Set};
use tally_shared::types::CompanyId;
use tracing::info;

use crate::entities::companies;

/// Company repository. Companies are the tenants every account and entry
/// belongs to.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a company by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_by_id(&self, id: CompanyId) -> Result<Option<companies::Model>, DbErr> {
        companies::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
    }

    /// Creates a company.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create(&self, name: &str) -> Result<companies::Model, DbErr> {
        self.create_with_id(CompanyId::new(), name).await
    }

    /// Creates a company with a known ID, used for fixtures and seeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database insert fails.
    pub async fn create_with_id(
        &self,
        id: CompanyId,
        name: &str,
    ) -> Result<companies::Model, DbErr> {
        let now = chrono::Utc::now().into();
        let company = companies::ActiveModel {
            id: Set(id.into_inner()),
            name: Set(name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }
}
