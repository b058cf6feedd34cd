//! SQLite-backed session store.
//!
//! Sessions are created open, actions append with a per-session monotone
//! sequence number, and finalization fixes the metadata and makes the
//! session immutable. All SQL runs on the `tokio_rusqlite` worker thread.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::debug;

use rewind_protocols::{RecordingSession, SemanticAction, SessionMetadata, StoreError};

use crate::schema::init_schema;

enum AppendOutcome {
    Appended(u64),
    NotFound,
    Finalized,
}

pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    /// Open (or create) a file-backed store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(path)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    /// In-memory store, for tests and ephemeral runs.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.call(|conn| init_schema(conn))
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Create an open session row. Fails if the id already exists.
    pub async fn create_session(
        &self,
        id: &str,
        created_at: DateTime<Utc>,
        starting_url: &str,
    ) -> Result<(), StoreError> {
        let id = id.to_string();
        let created = created_at.to_rfc3339();
        let url = starting_url.to_string();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO sessions (id, created_at, starting_url) VALUES (?1, ?2, ?3)",
                    params![id, created, url],
                )?;
                Ok(())
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    /// Append one action, assigning the next sequence number. Rejected once
    /// the session is finalized.
    pub async fn append_action(
        &self,
        session_id: &str,
        action: &SemanticAction,
    ) -> Result<u64, StoreError> {
        let payload = serde_json::to_string(action)?;
        let id = session_id.to_string();
        let outcome = self
            .conn
            .call(move |conn| {
                let closed: Option<i64> = match conn.query_row(
                    "SELECT closed FROM sessions WHERE id = ?1",
                    [&id],
                    |row| row.get(0),
                ) {
                    Ok(v) => Some(v),
                    Err(rusqlite::Error::QueryReturnedNoRows) => None,
                    Err(e) => return Err(e.into()),
                };
                match closed {
                    None => return Ok(AppendOutcome::NotFound),
                    Some(c) if c != 0 => return Ok(AppendOutcome::Finalized),
                    Some(_) => {}
                }

                let seq: i64 = conn.query_row(
                    "SELECT COALESCE(MAX(seq), -1) + 1 FROM actions WHERE session_id = ?1",
                    [&id],
                    |row| row.get(0),
                )?;
                conn.execute(
                    "INSERT INTO actions (session_id, seq, payload) VALUES (?1, ?2, ?3)",
                    params![id, seq, payload],
                )?;
                Ok(AppendOutcome::Appended(seq as u64))
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        match outcome {
            AppendOutcome::Appended(seq) => Ok(seq),
            AppendOutcome::NotFound => Err(StoreError::NotFound(session_id.to_string())),
            AppendOutcome::Finalized => Err(StoreError::SessionClosed(session_id.to_string())),
        }
    }

    /// Finalize a session: fix its metadata and reject further appends.
    /// Idempotent.
    pub async fn finalize_session(&self, metadata: &SessionMetadata) -> Result<(), StoreError> {
        let id = metadata.id.clone();
        let duration = metadata.duration_ms as i64;
        let actions = metadata.action_count as i64;
        let pages = metadata.pages_visited as i64;
        let complexity = metadata.complexity as i64;
        let updated = self
            .conn
            .call(move |conn| {
                let n = conn.execute(
                    "UPDATE sessions
                     SET duration_ms = ?2, action_count = ?3, pages_visited = ?4,
                         complexity = ?5, closed = 1
                     WHERE id = ?1",
                    params![id, duration, actions, pages, complexity],
                )?;
                Ok(n)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if updated == 0 {
            return Err(StoreError::NotFound(metadata.id.clone()));
        }
        debug!(session = %metadata.id, actions = metadata.action_count, "session finalized");
        Ok(())
    }

    /// Persist a completed session in one shot: create, append every
    /// action, finalize.
    pub async fn save_session(&self, session: &RecordingSession) -> Result<(), StoreError> {
        self.create_session(&session.id, session.created_at, &session.starting_url)
            .await?;
        for action in session.actions() {
            self.append_action(&session.id, action).await?;
        }
        self.finalize_session(&session.metadata()).await
    }

    /// Rebuild a full session, actions in sequence order.
    pub async fn get_session(&self, id: &str) -> Result<RecordingSession, StoreError> {
        let key = id.to_string();
        let row = self
            .conn
            .call(move |conn| {
                let header = match conn.query_row(
                    "SELECT created_at, starting_url, duration_ms, closed
                     FROM sessions WHERE id = ?1",
                    [&key],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, i64>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    },
                ) {
                    Ok(h) => h,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let mut stmt = conn.prepare(
                    "SELECT payload FROM actions WHERE session_id = ?1 ORDER BY seq ASC",
                )?;
                let payloads: Vec<String> = stmt
                    .query_map([&key], |row| row.get(0))?
                    .collect::<Result<_, _>>()?;
                Ok(Some((header, payloads)))
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let Some(((created_str, starting_url, duration_ms, closed), payloads)) = row else {
            return Err(StoreError::NotFound(id.to_string()));
        };

        let mut session = RecordingSession::new(id, starting_url);
        session.created_at = DateTime::parse_from_rfc3339(&created_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(session.created_at);
        for payload in payloads {
            let action: SemanticAction = serde_json::from_str(&payload)?;
            // A stored session is never over-limit, append cannot fail here.
            if session.append(action).is_err() {
                break;
            }
        }
        if closed != 0 {
            session.close();
            session.duration_ms = duration_ms.max(0) as u64;
        }
        Ok(session)
    }

    /// Session summaries, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionMetadata>, StoreError> {
        self.conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, created_at, starting_url, duration_ms, action_count,
                            pages_visited, complexity
                     FROM sessions ORDER BY created_at DESC",
                )?;
                let rows = stmt
                    .query_map([], |row| {
                        let created_str: String = row.get(1)?;
                        Ok(SessionMetadata {
                            id: row.get(0)?,
                            created_at: DateTime::parse_from_rfc3339(&created_str)
                                .map(|dt| dt.with_timezone(&Utc))
                                .unwrap_or_else(|_| Utc::now()),
                            starting_url: row.get(2)?,
                            duration_ms: row.get::<_, i64>(3)?.max(0) as u64,
                            action_count: row.get::<_, i64>(4)?.max(0) as usize,
                            pages_visited: row.get::<_, i64>(5)?.max(0) as usize,
                            complexity: row.get::<_, i64>(6)?.max(0) as u32,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))
    }

    /// Delete a session and its action log.
    pub async fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let key = id.to_string();
        let deleted = self
            .conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM actions WHERE session_id = ?1", [&key])?;
                let n = tx.execute("DELETE FROM sessions WHERE id = ?1", [&key])?;
                tx.commit()?;
                Ok(n)
            })
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if deleted == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
