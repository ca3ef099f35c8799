//! Ticket repository implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;
use helpdesk_entity::ticket::{
    NewHistoryEntry, NewTicket, StatusHistoryEntry, Ticket, TicketChange, TicketScope,
    TicketStatus,
};

use super::db_error;
use crate::store::TicketStore;

const LIST_ALL: &str =
    "SELECT * FROM tickets WHERE is_active ORDER BY created_at DESC, id DESC";
const LIST_ASSIGNED: &str =
    "SELECT * FROM tickets WHERE is_active AND assigned_to = $1 ORDER BY created_at DESC, id DESC";
const LIST_COMPANY: &str =
    "SELECT * FROM tickets WHERE is_active AND company_id = $1 ORDER BY created_at DESC, id DESC";

/// Repository for tickets and their status history.
#[derive(Debug, Clone)]
pub struct TicketRepository {
    pool: PgPool,
}

impl TicketRepository {
    /// Create a new ticket repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert_history(
    conn: &mut PgConnection,
    ticket_id: i64,
    entry: &NewHistoryEntry,
) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO ticket_status_history (ticket_id, status_id, user_id, notes) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(ticket_id)
    .bind(entry.status_id)
    .bind(entry.user_id)
    .bind(&entry.notes)
    .execute(conn)
    .await
    .map_err(db_error("Failed to append status history"))?;
    Ok(())
}

#[async_trait]
impl TicketStore for TicketRepository {
    async fn list(&self, scope: TicketScope) -> AppResult<Vec<Ticket>> {
        let query = match scope {
            TicketScope::All => sqlx::query_as::<_, Ticket>(LIST_ALL),
            TicketScope::AssignedTo(user_id) => {
                sqlx::query_as::<_, Ticket>(LIST_ASSIGNED).bind(user_id)
            }
            TicketScope::Company(company_id) => {
                sqlx::query_as::<_, Ticket>(LIST_COMPANY).bind(company_id)
            }
            TicketScope::Nothing => return Ok(Vec::new()),
        };
        query
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to list tickets"))
    }

    async fn find(&self, id: i64) -> AppResult<Option<Ticket>> {
        sqlx::query_as::<_, Ticket>("SELECT * FROM tickets WHERE id = $1 AND is_active")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("Failed to find ticket"))
    }

    async fn history(&self, ticket_id: i64) -> AppResult<Vec<StatusHistoryEntry>> {
        sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM ticket_status_history WHERE ticket_id = $1 ORDER BY created_at, id",
        )
        .bind(ticket_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load status history"))
    }

    async fn histories(
        &self,
        ticket_ids: &[i64],
    ) -> AppResult<HashMap<i64, Vec<StatusHistoryEntry>>> {
        if ticket_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM ticket_status_history WHERE ticket_id = ANY($1) \
             ORDER BY ticket_id, created_at, id",
        )
        .bind(ticket_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to load status histories"))?;

        let mut grouped: HashMap<i64, Vec<StatusHistoryEntry>> = HashMap::new();
        for row in rows {
            grouped.entry(row.ticket_id).or_default().push(row);
        }
        Ok(grouped)
    }

    async fn create(&self, ticket: NewTicket, entry: NewHistoryEntry) -> AppResult<Ticket> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin ticket creation"))?;

        let created = sqlx::query_as::<_, Ticket>(
            "INSERT INTO tickets (company_id, module_id, subject, description, mail_content, \
             email, status_id, priority_id, assigned_to, due_date, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING *",
        )
        .bind(ticket.company_id)
        .bind(ticket.module_id)
        .bind(&ticket.subject)
        .bind(&ticket.description)
        .bind(&ticket.mail_content)
        .bind(&ticket.email)
        .bind(TicketStatus::New)
        .bind(ticket.priority_id)
        .bind(ticket.assigned_to)
        .bind(ticket.due_date)
        .bind(ticket.created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert ticket"))?;

        insert_history(&mut tx, created.id, &entry).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit ticket creation"))?;
        Ok(created)
    }

    async fn apply(&self, change: TicketChange) -> AppResult<Ticket> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin ticket update"))?;

        // The version predicate makes this a compare-and-swap; the row lock
        // taken by UPDATE serializes racing writers.
        let updated = sqlx::query_as::<_, Ticket>(
            "UPDATE tickets SET status_id = $3, priority_id = $4, assigned_to = $5, \
             due_date = $6, resolved_at = $7, updated_by = $8, updated_at = $9, \
             version = version + 1 \
             WHERE id = $1 AND version = $2 AND is_active RETURNING *",
        )
        .bind(change.ticket_id)
        .bind(change.expected_version)
        .bind(change.status_id)
        .bind(change.priority_id)
        .bind(change.assigned_to)
        .bind(change.due_date)
        .bind(change.resolved_at)
        .bind(change.updated_by)
        .bind(change.updated_at)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_error("Failed to update ticket"))?;

        let Some(ticket) = updated else {
            let still_active: bool = sqlx::query_scalar(
                "SELECT EXISTS (SELECT 1 FROM tickets WHERE id = $1 AND is_active)",
            )
            .bind(change.ticket_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error("Failed to check ticket"))?;
            return Err(if still_active {
                AppError::conflict(format!(
                    "Ticket {} was modified concurrently",
                    change.ticket_id
                ))
            } else {
                AppError::not_found(format!("Ticket {} not found", change.ticket_id))
            });
        };

        if let Some(entry) = &change.history {
            insert_history(&mut tx, ticket.id, entry).await?;
        }

        tx.commit()
            .await
            .map_err(db_error("Failed to commit ticket update"))?;
        Ok(ticket)
    }

    async fn deactivate(&self, id: i64, actor: i64, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE tickets SET is_active = FALSE, updated_by = $2, updated_at = $3, \
             version = version + 1 WHERE id = $1 AND is_active",
        )
        .bind(id)
        .bind(actor)
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to deactivate ticket"))?;
        Ok(result.rows_affected() > 0)
    }
}
