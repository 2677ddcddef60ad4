use crate::domain::model::{Ticket, TicketId, TicketStatus};
use crate::domain::ports::TicketStore;
use crate::utils::error::{RouterError, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const IN_MEMORY: &str = ":memory:";

/// Redraws allowed when a generated id collides with an existing ticket.
const MAX_ID_ATTEMPTS: u32 = 64;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS support_tickets (
    ticket_id TEXT PRIMARY KEY,
    status TEXT NOT NULL,
    description TEXT NOT NULL,
    created_at TIMESTAMP NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_support_tickets_created_at ON support_tickets (created_at);
";

/// SQLite-backed ticket store. All access goes through one connection behind a
/// mutex, which also serializes id selection against concurrent creators.
#[derive(Clone)]
pub struct SqliteTicketStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteTicketStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = if path == Path::new(IN_MEMORY) {
            Connection::open_in_memory()?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            Connection::open(path)?
        };
        conn.execute_batch(SCHEMA)?;

        tracing::debug!("🗄️ Ticket store ready at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn in_memory() -> Result<Self> {
        Self::open(IN_MEMORY)
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| RouterError::InternalError {
                message: "ticket store lock poisoned".to_string(),
            })?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| RouterError::InternalError {
            message: format!("ticket store task failed: {}", e),
        })?
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

fn insert_with_fresh_id(conn: &mut Connection, description: &str) -> Result<TicketId> {
    let mut rng = rand::thread_rng();
    let created_at = Utc::now();

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let id = TicketId::random(&mut rng);
        let inserted = conn.execute(
            "INSERT INTO support_tickets (ticket_id, status, description, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![id.as_str(), TicketStatus::Unresolved.as_str(), description, created_at],
        );

        match inserted {
            Ok(_) => return Ok(id),
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!("🎫 Ticket id {} already taken (attempt {})", id, attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RouterError::TicketIdExhausted {
        attempts: MAX_ID_ATTEMPTS,
    })
}

fn conversion_failure(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message)),
    )
}

fn row_to_ticket(row: &rusqlite::Row<'_>) -> rusqlite::Result<Ticket> {
    let id: String = row.get(0)?;
    let status: String = row.get(1)?;
    let description: String = row.get(2)?;
    let created_at: DateTime<Utc> = row.get(3)?;

    let id = id
        .parse::<TicketId>()
        .map_err(|e| conversion_failure(0, e))?;
    let status = status
        .parse::<TicketStatus>()
        .map_err(|e| conversion_failure(1, e))?;

    Ok(Ticket {
        id,
        status,
        description,
        created_at,
    })
}

fn select_ticket(conn: &Connection, id: &str) -> Result<Option<Ticket>> {
    let ticket = conn
        .query_row(
            "SELECT ticket_id, status, description, created_at FROM support_tickets WHERE ticket_id = ?1",
            params![id],
            row_to_ticket,
        )
        .optional()?;
    Ok(ticket)
}

impl TicketStore for SqliteTicketStore {
    async fn create(&self, description: &str) -> Result<TicketId> {
        let description = description.to_string();
        let id = self
            .with_conn(move |conn| insert_with_fresh_id(conn, &description))
            .await?;
        tracing::info!("🎫 Created ticket #{}", id);
        Ok(id)
    }

    async fn get(&self, id: &str) -> Result<Option<Ticket>> {
        let id = id.to_string();
        self.with_conn(move |conn| select_ticket(conn, &id)).await
    }

    async fn list(&self) -> Result<Vec<Ticket>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT ticket_id, status, description, created_at FROM support_tickets ORDER BY created_at DESC, rowid DESC",
            )?;
            let tickets = stmt
                .query_map([], row_to_ticket)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(tickets)
        })
        .await
    }

    async fn update_status(&self, id: &str, status: TicketStatus) -> Result<Option<Ticket>> {
        let id = id.to_string();
        let updated = self
            .with_conn(move |conn| {
                let changed = conn.execute(
                    "UPDATE support_tickets SET status = ?1 WHERE ticket_id = ?2",
                    params![status.as_str(), id],
                )?;
                if changed == 0 {
                    return Ok(None);
                }
                select_ticket(conn, &id)
            })
            .await?;

        if let Some(ticket) = &updated {
            tracing::info!("🎫 Ticket #{} is now {}", ticket.id, ticket.status);
        }
        Ok(updated)
    }
}
