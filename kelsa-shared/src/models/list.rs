/// List (column) model and database operations
///
/// Lists are ordered left-to-right within a board by `position`, a dense
/// zero-based integer.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE lists (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL,
///     position INTEGER NOT NULL CHECK (position >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A column on a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct List {
    /// Unique list ID
    pub id: Uuid,

    /// Board this list belongs to
    pub board_id: Uuid,

    /// Column title
    pub name: String,

    /// Zero-based rank within the board
    pub position: i32,

    /// When the list was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateList {
    /// Board to append to
    pub board_id: Uuid,

    /// Column title
    pub name: String,

    /// Position (the current list count when appending)
    pub position: i32,
}

/// New position for one list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListPosition {
    pub id: Uuid,
    pub position: i32,
}

impl List {
    /// Creates a new list
    pub async fn create(pool: &PgPool, data: CreateList) -> Result<Self, sqlx::Error> {
        let list = sqlx::query_as::<_, List>(
            r#"
            INSERT INTO lists (board_id, name, position)
            VALUES ($1, $2, $3)
            RETURNING id, board_id, name, position, created_at
            "#,
        )
        .bind(data.board_id)
        .bind(data.name)
        .bind(data.position)
        .fetch_one(pool)
        .await?;

        Ok(list)
    }

    /// Finds a list by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let list = sqlx::query_as::<_, List>(
            "SELECT id, board_id, name, position, created_at FROM lists WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(list)
    }

    /// Lists all columns of a board ordered by position
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let lists = sqlx::query_as::<_, List>(
            r#"
            SELECT id, board_id, name, position, created_at
            FROM lists
            WHERE board_id = $1
            ORDER BY position ASC, created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(lists)
    }

    /// Renames a list
    ///
    /// # Returns
    ///
    /// True if the list exists
    pub async fn rename(pool: &PgPool, id: Uuid, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE lists SET name = $2 WHERE id = $1")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a list and its cards
    ///
    /// Cards are removed explicitly inside the same transaction so the
    /// cascade does not depend on the foreign key definition.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM cards WHERE list_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rewrites the position of several lists atomically
    ///
    /// Either every row is updated or none is.
    pub async fn apply_positions(
        pool: &PgPool,
        positions: &[ListPosition],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for entry in positions {
            let result = sqlx::query("UPDATE lists SET position = $2 WHERE id = $1")
                .bind(entry.id)
                .bind(entry.position)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls back the rows already written
                return Err(sqlx::Error::RowNotFound);
            }
        }

        tx.commit().await?;

        Ok(())
    }
}
