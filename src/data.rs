use crate::error::RosterResult;
use sqlx::PgConnection;

pub mod student;

/// What happened to an `INSERT` that didn't fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome<Id> {
    Inserted(Id),
    DuplicateKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NotFound,
    DuplicateKey,
}

pub trait DataType: Sized {
    type Id;
    type FormForAdding;

    async fn get_from_db_by_id(id: Self::Id, conn: &mut PgConnection) -> RosterResult<Option<Self>>;
    async fn get_all(conn: &mut PgConnection) -> RosterResult<Vec<Self>>;
    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> RosterResult<InsertOutcome<Self::Id>>;
    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForAdding,
        conn: &mut PgConnection,
    ) -> RosterResult<UpdateOutcome>;
    /// Returns the removed row, or `None` if nothing matched `id`.
    async fn remove_from_database(id: Self::Id, conn: &mut PgConnection) -> RosterResult<Option<Self>>;
}

pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_error) if db_error.is_unique_violation())
}
