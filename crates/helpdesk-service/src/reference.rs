//! Read-only lookup tables.

use std::sync::Arc;

use helpdesk_auth::{Permission, RbacEnforcer};
use helpdesk_core::result::AppResult;
use helpdesk_database::store::ReferenceStore;
use helpdesk_entity::reference::LookupEntry;

use crate::context::RequestContext;

/// Serves modules, statuses and priorities to any authenticated caller.
#[derive(Debug, Clone)]
pub struct ReferenceService {
    reference: Arc<dyn ReferenceStore>,
    rbac: Arc<RbacEnforcer>,
}

impl ReferenceService {
    pub fn new(reference: Arc<dyn ReferenceStore>, rbac: Arc<RbacEnforcer>) -> Self {
        Self { reference, rbac }
    }

    pub async fn modules(&self, ctx: &RequestContext) -> AppResult<Vec<LookupEntry>> {
        self.rbac.require(&ctx.identity, Permission::ViewReferenceData)?;
        self.reference.modules().await
    }

    pub async fn statuses(&self, ctx: &RequestContext) -> AppResult<Vec<LookupEntry>> {
        self.rbac.require(&ctx.identity, Permission::ViewReferenceData)?;
        self.reference.statuses().await
    }

    pub async fn priorities(&self, ctx: &RequestContext) -> AppResult<Vec<LookupEntry>> {
        self.rbac.require(&ctx.identity, Permission::ViewReferenceData)?;
        self.reference.priorities().await
    }
}
