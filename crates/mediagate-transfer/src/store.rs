//! Attachment store

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension};

use mediagate_storage::Database;

use crate::attachment::{Attachment, AttachmentId, TransferState};
use crate::error::TransferError;
use crate::Result;

/// Authoritative owner of attachment transfer state.
pub trait AttachmentStore: Send + Sync {
    fn get_attachment(&self, id: &AttachmentId) -> Result<Option<Attachment>>;

    /// Unconditionally set the transfer state.
    ///
    /// Records are addressed by attachment id alone; `message_id` names the
    /// owning message for logging.
    fn set_transfer_state(
        &self,
        message_id: i64,
        id: &AttachmentId,
        state: TransferState,
    ) -> Result<()>;

    /// Move `from` -> `to` atomically. Returns `false` when the record was not
    /// in `from` (or is gone), leaving it untouched.
    fn transition_transfer_state(
        &self,
        message_id: i64,
        id: &AttachmentId,
        from: TransferState,
        to: TransferState,
    ) -> Result<bool>;
}

/// SQLite-backed attachment records.
#[derive(Clone)]
pub struct AttachmentRepository {
    db: Database,
}

const SELECT_COLUMNS: &str = "SELECT row_id, unique_id, message_id, content_type,
        transfer_state, created_at, updated_at
 FROM attachments";

struct AttachmentRow {
    id: AttachmentId,
    message_id: i64,
    content_type: String,
    transfer_state: String,
    created_at: String,
    updated_at: String,
}

impl AttachmentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: AttachmentId::new(row.get(0)?, row.get(1)?),
            message_id: row.get(2)?,
            content_type: row.get(3)?,
            transfer_state: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }

    fn into_attachment(self) -> Result<Attachment> {
        let transfer_state = self
            .transfer_state
            .parse::<TransferState>()
            .map_err(TransferError::InvalidState)?;

        Ok(Attachment {
            id: self.id,
            message_id: self.message_id,
            content_type: self.content_type,
            transfer_state,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: parse_timestamp(&self.updated_at)?,
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| TransferError::InvalidTimestamp(format!("{raw}: {e}")))
}

impl AttachmentRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Insert or replace an attachment record.
    pub fn save_attachment(&self, attachment: &Attachment) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO attachments
                 (row_id, unique_id, message_id, content_type, transfer_state,
                  created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    attachment.id.row_id,
                    attachment.id.unique_id,
                    attachment.message_id,
                    attachment.content_type,
                    attachment.transfer_state.as_str(),
                    attachment.created_at.to_rfc3339(),
                    attachment.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!(
            attachment_id = %attachment.id,
            message_id = attachment.message_id,
            state = %attachment.transfer_state,
            "Saved attachment"
        );

        Ok(())
    }

    /// Attachments waiting for automatic-download approval, oldest first.
    pub fn auto_pending(&self) -> Result<Vec<Attachment>> {
        self.query_by_state(TransferState::AutoPending)
    }

    fn query_by_state(&self, state: TransferState) -> Result<Vec<Attachment>> {
        let rows = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS} WHERE transfer_state = ?1 ORDER BY created_at, row_id"
            ))?;
            let rows = stmt
                .query_map([state.as_str()], AttachmentRow::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;

        rows.into_iter().map(AttachmentRow::into_attachment).collect()
    }

    fn update_state(
        conn: &Connection,
        id: &AttachmentId,
        state: TransferState,
        expected: Option<TransferState>,
    ) -> rusqlite::Result<usize> {
        let updated_at = Utc::now().to_rfc3339();

        match expected {
            Some(from) => conn.execute(
                "UPDATE attachments SET transfer_state = ?1, updated_at = ?2
                 WHERE row_id = ?3 AND unique_id = ?4 AND transfer_state = ?5",
                rusqlite::params![
                    state.as_str(),
                    updated_at,
                    id.row_id,
                    id.unique_id,
                    from.as_str(),
                ],
            ),
            None => conn.execute(
                "UPDATE attachments SET transfer_state = ?1, updated_at = ?2
                 WHERE row_id = ?3 AND unique_id = ?4",
                rusqlite::params![state.as_str(), updated_at, id.row_id, id.unique_id],
            ),
        }
    }
}

impl AttachmentStore for AttachmentRepository {
    fn get_attachment(&self, id: &AttachmentId) -> Result<Option<Attachment>> {
        let row = self.db.with_connection(|conn| {
            let row = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE row_id = ?1 AND unique_id = ?2"),
                    [id.row_id, id.unique_id],
                    AttachmentRow::from_row,
                )
                .optional()?;
            Ok(row)
        })?;

        row.map(AttachmentRow::into_attachment).transpose()
    }

    fn set_transfer_state(
        &self,
        message_id: i64,
        id: &AttachmentId,
        state: TransferState,
    ) -> Result<()> {
        let changed = self.db.transaction(|conn| {
            Ok(Self::update_state(conn, id, state, None)?)
        })?;

        if changed == 0 {
            return Err(TransferError::NotFound(*id));
        }

        tracing::info!(
            attachment_id = %id,
            message_id,
            state = %state,
            "Set transfer state"
        );

        Ok(())
    }

    fn transition_transfer_state(
        &self,
        message_id: i64,
        id: &AttachmentId,
        from: TransferState,
        to: TransferState,
    ) -> Result<bool> {
        let changed = self.db.transaction(|conn| {
            Ok(Self::update_state(conn, id, to, Some(from))?)
        })?;

        if changed == 0 {
            tracing::debug!(
                attachment_id = %id,
                from = %from,
                to = %to,
                "Transfer state transition skipped"
            );
            return Ok(false);
        }

        tracing::info!(
            attachment_id = %id,
            message_id,
            from = %from,
            to = %to,
            "Transfer state transitioned"
        );

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> AttachmentRepository {
        AttachmentRepository::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn test_save_and_get() {
        let repo = repository();
        let id = AttachmentId::new(1, 42);

        assert!(repo.get_attachment(&id).unwrap().is_none());

        repo.save_attachment(&Attachment::new(10, id, "video/mp4"))
            .unwrap();

        let stored = repo.get_attachment(&id).unwrap().unwrap();
        assert_eq!(stored.message_id, 10);
        assert_eq!(stored.content_type, "video/mp4");
        assert_eq!(stored.transfer_state, TransferState::AutoPending);
    }

    #[test]
    fn test_set_transfer_state() {
        let repo = repository();
        let id = AttachmentId::new(2, 7);
        repo.save_attachment(&Attachment::new(3, id, "image/jpeg"))
            .unwrap();

        repo.set_transfer_state(3, &id, TransferState::PendingManual)
            .unwrap();
        assert_eq!(
            repo.get_attachment(&id).unwrap().unwrap().transfer_state,
            TransferState::PendingManual
        );

        let missing = AttachmentId::new(99, 99);
        assert!(matches!(
            repo.set_transfer_state(3, &missing, TransferState::Started),
            Err(TransferError::NotFound(_))
        ));
    }

    #[test]
    fn test_transition_is_compare_and_set() {
        let repo = repository();
        let id = AttachmentId::new(5, 1);
        repo.save_attachment(&Attachment::new(8, id, "audio/ogg"))
            .unwrap();

        assert!(repo
            .transition_transfer_state(8, &id, TransferState::AutoPending, TransferState::Started)
            .unwrap());
        assert!(!repo
            .transition_transfer_state(8, &id, TransferState::AutoPending, TransferState::Started)
            .unwrap());
        assert_eq!(
            repo.get_attachment(&id).unwrap().unwrap().transfer_state,
            TransferState::Started
        );
    }

    #[test]
    fn test_auto_pending_listing() {
        let repo = repository();
        repo.save_attachment(&Attachment::new(1, AttachmentId::new(1, 1), "image/png"))
            .unwrap();
        repo.save_attachment(
            &Attachment::new(1, AttachmentId::new(2, 2), "image/png")
                .with_state(TransferState::Done),
        )
        .unwrap();
        repo.save_attachment(&Attachment::new(2, AttachmentId::new(3, 3), "audio/aac"))
            .unwrap();

        let pending = repo.auto_pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert!(pending
            .iter()
            .all(|a| a.transfer_state == TransferState::AutoPending));

    }

    #[test]
    fn test_unknown_stored_state_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let repo = AttachmentRepository::new(db.clone());
        let id = AttachmentId::new(4, 4);
        repo.save_attachment(&Attachment::new(1, id, "image/png"))
            .unwrap();

        db.with_connection(|conn| {
            conn.execute("UPDATE attachments SET transfer_state = 'paused'", [])?;
            Ok(())
        })
        .unwrap();

        assert!(matches!(
            repo.get_attachment(&id),
            Err(TransferError::InvalidState(_))
        ));
    }

    #[test]
    fn test_transition_addresses_attachment_id_only() {
        let repo = repository();
        let id = AttachmentId::new(6, 60);
        repo.save_attachment(&Attachment::new(5, id, "image/png"))
            .unwrap();

        // A job queued under a different message id still moves the record
        assert!(repo
            .transition_transfer_state(6, &id, TransferState::AutoPending, TransferState::Started)
            .unwrap());
        assert_eq!(
            repo.get_attachment(&id).unwrap().unwrap().transfer_state,
            TransferState::Started
        );

        repo.set_transfer_state(6, &id, TransferState::Done).unwrap();
        let stored = repo.get_attachment(&id).unwrap().unwrap();
        assert_eq!(stored.transfer_state, TransferState::Done);
        assert_eq!(stored.message_id, 5);
    }

    #[test]
    fn test_corrupt_timestamp_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        let repo = AttachmentRepository::new(db.clone());
        let id = AttachmentId::new(7, 70);
        repo.save_attachment(&Attachment::new(1, id, "audio/ogg"))
            .unwrap();

        db.with_connection(|conn| {
            conn.execute("UPDATE attachments SET created_at = 'yesterday'", [])?;
            Ok(())
        })
        .unwrap();

        assert!(matches!(
            repo.get_attachment(&id),
            Err(TransferError::InvalidTimestamp(_))
        ));
    }
}
