//! Attachment upload, listing, download and deletion.

use std::sync::Arc;

use tracing::{error, info, warn};

use helpdesk_auth::{Permission, RbacEnforcer};
use helpdesk_core::config::AttachmentConfig;
use helpdesk_core::error::AppError;
use helpdesk_core::result::AppResult;
use helpdesk_core::traits::storage::{ByteStream, StorageProvider};
use helpdesk_database::store::AttachmentStore;
use helpdesk_entity::attachment::{Attachment, NewAttachment};
use helpdesk_storage::attachment_key;

use super::validation::{self, IncomingFile};
use crate::context::RequestContext;
use crate::ticket::TicketService;

/// Binds uploaded files to tickets.
#[derive(Debug, Clone)]
pub struct AttachmentService {
    attachments: Arc<dyn AttachmentStore>,
    tickets: TicketService,
    storage: Arc<dyn StorageProvider>,
    rbac: Arc<RbacEnforcer>,
    config: AttachmentConfig,
}

impl AttachmentService {
    /// Creates a new attachment service.
    pub fn new(
        attachments: Arc<dyn AttachmentStore>,
        tickets: TicketService,
        storage: Arc<dyn StorageProvider>,
        rbac: Arc<RbacEnforcer>,
        config: AttachmentConfig,
    ) -> Self {
        Self {
            attachments,
            tickets,
            storage,
            rbac,
            config,
        }
    }

    /// Store a batch of files on a visible ticket.
    ///
    /// The whole batch is validated before anything is stored. Files are
    /// then stored one at a time; if any write or metadata insert fails,
    /// every file of the batch stored so far is removed again (rows and
    /// bytes) and the error is returned.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        ticket_id: i64,
        files: Vec<IncomingFile>,
    ) -> AppResult<Vec<Attachment>> {
        self.rbac.require(&ctx.identity, Permission::UploadAttachment)?;
        validation::validate_batch(&self.config, &files)?;
        let ticket = self.tickets.visible_ticket(ctx, ticket_id).await?;

        let mut stored = Vec::with_capacity(files.len());
        for file in files {
            let key = attachment_key(ticket.id, &file.file_name);
            let size_bytes = file.data.len() as i64;
            if let Err(e) = self.storage.write(&key, file.data).await {
                error!(ticket_id, actor_id = ctx.user_id(), key = %key, error = %e, "Attachment write failed");
                self.discard(&stored).await;
                return Err(e);
            }

            let record = NewAttachment {
                ticket_id: ticket.id,
                file_name: file.file_name,
                storage_key: key.clone(),
                size_bytes,
                mime_type: file
                    .content_type
                    .as_deref()
                    .map(|ct| validation::truncate_content_type(ct, self.config.content_type_max_len)),
                uploaded_by: ctx.user_id(),
            };

            match self.attachments.create(record).await {
                Ok(attachment) => stored.push(attachment),
                Err(e) => {
                    error!(ticket_id, actor_id = ctx.user_id(), key = %key, error = %e, "Attachment metadata insert failed");
                    if let Err(cleanup) = self.storage.delete(&key).await {
                        warn!(key = %key, error = %cleanup, "Failed to remove orphaned attachment bytes");
                    }
                    self.discard(&stored).await;
                    return Err(e);
                }
            }
        }

        info!(
            ticket_id,
            actor_id = ctx.user_id(),
            count = stored.len(),
            "Attachments uploaded"
        );
        Ok(stored)
    }

    /// Files of a visible ticket, newest first.
    pub async fn list(&self, ctx: &RequestContext, ticket_id: i64) -> AppResult<Vec<Attachment>> {
        self.rbac.require(&ctx.identity, Permission::ViewAttachments)?;
        let ticket = self.tickets.visible_ticket(ctx, ticket_id).await?;
        self.attachments.list_by_ticket(ticket.id).await
    }

    /// Metadata and content stream of one file on a visible ticket.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        file_id: i64,
    ) -> AppResult<(Attachment, ByteStream)> {
        self.rbac.require(&ctx.identity, Permission::ViewAttachments)?;
        let attachment = self.find(file_id).await?;
        self.tickets
            .visible_ticket(ctx, attachment.ticket_id)
            .await?;

        let stream = self.storage.read(&attachment.storage_key).await?;
        Ok((attachment, stream))
    }

    /// Remove a file's bytes and its metadata row.
    ///
    /// Files of inactive tickets do not exist for this call. Missing bytes
    /// are logged and the row is removed anyway.
    pub async fn delete(&self, ctx: &RequestContext, file_id: i64) -> AppResult<()> {
        self.rbac.require(&ctx.identity, Permission::DeleteAttachment)?;
        let attachment = self.find(file_id).await?;
        self.tickets
            .visible_ticket(ctx, attachment.ticket_id)
            .await?;

        let removed = self.storage.delete(&attachment.storage_key).await?;
        if !removed {
            warn!(
                file_id,
                key = %attachment.storage_key,
                "Stored attachment was already missing; removing metadata"
            );
        }
        self.attachments.delete(file_id).await?;

        info!(
            file_id,
            ticket_id = attachment.ticket_id,
            actor_id = ctx.user_id(),
            "Attachment deleted"
        );
        Ok(())
    }

    /// Best-effort removal of files stored earlier in a failed batch.
    async fn discard(&self, stored: &[Attachment]) {
        for attachment in stored {
            if let Err(e) = self.attachments.delete(attachment.id).await {
                warn!(file_id = attachment.id, error = %e, "Failed to remove attachment row of failed batch");
            }
            if let Err(e) = self.storage.delete(&attachment.storage_key).await {
                warn!(key = %attachment.storage_key, error = %e, "Failed to remove attachment bytes of failed batch");
            }
        }
    }

    async fn find(&self, file_id: i64) -> AppResult<Attachment> {
        self.attachments
            .find(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))
    }
}
