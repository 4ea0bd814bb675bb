use async_trait::async_trait;
use deadpool_postgres::Pool;

use crate::{
    error::{AppError, Result},
    models::session::{NewSession, Session, SessionPatch},
    validation::session as rules,
};

/// Persistence capability for sessions.
///
/// The API handlers use it server-side and the tracker uses it client-side,
/// so the same contract holds for the database, the in-memory store and the
/// HTTP client.
#[async_trait]
pub trait SessionStore: Send + Sync + 'static {
    /// Inserts a session and returns it with its assigned id.
    async fn create(&self, new: NewSession) -> Result<Session>;

    /// All sessions, most recent `start` first.
    async fn list(&self) -> Result<Vec<Session>>;

    /// The session with the given id, if any.
    async fn get(&self, id: i64) -> Result<Option<Session>>;

    /// Applies a partial update and returns the merged record.
    /// The `WHERE` clause only matches while `end` is unset or unchanged, so a
    /// concurrent completion cannot overwrite an `end` that was already set.
    /// The table `CHECK`s cover the timing invariants of the merged row.
    async fn update(&self, id: i64, patch: SessionPatch) -> Result<Session> {
        if let Some(description) = &patch.description {
            rules::validate_text("description", description)?;
        }

        let client = self.pool.get().await?;
        let query = format!(
            r#"
            UPDATE deep_work_sessions
            SET description = COALESCE($2, description),
                "end"       = COALESCE($3, "end"),
                focused     = COALESCE($4, focused)
            WHERE id = $1
              AND ("end" IS NULL OR $3 IS NULL OR "end" = $3)
            RETURNING {COLUMNS}
            "#
        );
        let statement = client.prepare_cached(&query).await?;
        let row = client
            .query_opt(
                &statement,
                &[&id, &patch.description, &patch.end, &patch.focused],
            )
            .await?;

        match row {
            Some(row) => Ok(Session::try_from(&row)?),
            None => match self.get(id).await? {
                Some(_) => Err(AppError::Validation(format!(
                    "Session {} has already been completed",
                    id
                ))),
                None => Err(AppError::NotFound(id)),
            },
        }
    }

    async fn delete(&self, id: i64) -> Result<()>;
}

const COLUMNS: &str = r#"id, start, "end", focused, tag, description"#;

/// A `SessionStore` backed by the `deep_work_sessions` table.
#[derive(Clone)]
pub struct PgSessionStore {
    pool: Pool,
}

impl PgSessionStore {
    /// Creates a new `PgSessionStore`.
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn create(&self, new: NewSession) -> Result<Session> {
        new.validate()?;
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            INSERT INTO deep_work_sessions (start, "end", focused, tag, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COLUMNS}
            "#
        );
        let statement = client.prepare_cached(&query).await?;
        let row = client
            .query_one(
                &statement,
                &[&new.start, &new.end, &new.focused, &new.tag, &new.description],
            )
            .await?;

        Ok(Session::try_from(&row)?)
    }

    async fn list(&self) -> Result<Vec<Session>> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            SELECT {COLUMNS}
            FROM deep_work_sessions
            ORDER BY start DESC
            "#
        );
        let statement = client.prepare_cached(&query).await?;
        let rows = client.query(&statement, &[]).await?;

        rows.iter()
            .map(|row| Session::try_from(row).map_err(AppError::from))
            .collect()
    }

    async fn get(&self, id: i64) -> Result<Option<Session>> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            SELECT {COLUMNS}
            FROM deep_work_sessions
            WHERE id = $1
            "#
        );
        let statement = client.prepare_cached(&query).await?;
        let row = client.query_opt(&statement, &[&id]).await?;

        row.map(|r| Session::try_from(&r).map_err(AppError::from))
            .transpose()
    }

    async fn update(&self, id: i64, patch: SessionPatch) -> Result<Session> {
        let client = self.pool.get().await?;
        let query = format!(
            r#"
            UPDATE deep_work_sessions
            SET description = COALESCE($2, description),
                "end"       = COALESCE($3, "end"),
                focused     = COALESCE($4, focused)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let statement = client.prepare_cached(&query).await?;
        let row = client
            .query_opt(
                &statement,
                &[&id, &patch.description, &patch.end, &patch.focused],
            )
            .await?
            .ok_or(AppError::NotFound(id))?;

        Ok(Session::try_from(&row)?)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let client = self.pool.get().await?;
        let statement = client
            .prepare_cached("DELETE FROM deep_work_sessions WHERE id = $1")
            .await?;
        let removed = client.execute(&statement, &[&id]).await?;
        tracing::debug!("🗑️ Deleted {} row(s) for session {}", removed, id);
        Ok(())
    }
}
