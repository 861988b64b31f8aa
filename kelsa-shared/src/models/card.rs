/// Card model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE cards (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     list_id UUID NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
///     content TEXT NOT NULL,
///     position INTEGER NOT NULL CHECK (position >= 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A task item inside a list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Card {
    /// Unique card ID
    pub id: Uuid,

    /// List this card belongs to
    pub list_id: Uuid,

    /// Free-text content
    pub content: String,

    /// Zero-based rank within the list
    pub position: i32,

    /// When the card was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a card
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCard {
    pub list_id: Uuid,
    pub content: String,
    pub position: i32,
}

/// New container and position for one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPlacement {
    pub id: Uuid,
    pub list_id: Uuid,
    pub position: i32,
}

impl Card {
    /// Creates a new card
    pub async fn create(pool: &PgPool, data: CreateCard) -> Result<Self, sqlx::Error> {
        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (list_id, content, position)
            VALUES ($1, $2, $3)
            RETURNING id, list_id, content, position, created_at
            "#,
        )
        .bind(data.list_id)
        .bind(data.content)
        .bind(data.position)
        .fetch_one(pool)
        .await?;

        Ok(card)
    }

    /// Finds a card by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let card = sqlx::query_as::<_, Card>(
            "SELECT id, list_id, content, position, created_at FROM cards WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(card)
    }

    /// Lists every card on a board, grouped by list order then card position
    pub async fn list_by_board(pool: &PgPool, board_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let cards = sqlx::query_as::<_, Card>(
            r#"
            SELECT c.id, c.list_id, c.content, c.position, c.created_at
            FROM cards c
            JOIN lists l ON l.id = c.list_id
            WHERE l.board_id = $1
            ORDER BY l.position ASC, c.position ASC, c.created_at ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(pool)
        .await?;

        Ok(cards)
    }

    /// Counts the cards of a list
    pub async fn count_by_list(pool: &PgPool, list_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cards WHERE list_id = $1")
            .bind(list_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Deletes a card
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Rewrites list membership and position of several cards atomically
    pub async fn apply_placements(
        pool: &PgPool,
        placements: &[CardPlacement],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;

        for placement in placements {
            let result = sqlx::query("UPDATE cards SET list_id = $2, position = $3 WHERE id = $1")
                .bind(placement.id)
                .bind(placement.list_id)
                .bind(placement.position)
                .execute(&mut *tx)
                .await?;

            if result.rows_affected() == 0 {
                return Err(sqlx::Error::RowNotFound);
            }
        }

        tx.commit().await?;

        Ok(())
    }
}
