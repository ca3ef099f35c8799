//! Role-to-permission mapping definitions.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use helpdesk_entity::user::Role;

/// An operation or field-level capability gated by role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Tickets
    /// List tickets within the caller's scope.
    ListTickets,
    /// Open a ticket within the caller's scope.
    ViewTicket,
    /// Create tickets.
    CreateTicket,
    /// Create tickets for any company instead of the caller's own.
    ChooseCompany,
    /// Set the assignee when creating a ticket.
    AssignOnCreate,
    /// Update status, due date and notes of tickets within scope.
    UpdateTicket,
    /// Change the assignee of an existing ticket.
    AssignTicket,
    /// Change the priority of an existing ticket.
    SetPriority,
    /// Move a ticket into the New status.
    ReopenToNew,
    /// Soft-delete tickets.
    DeleteTicket,

    // Attachments
    /// Upload files to a visible ticket.
    UploadAttachment,
    /// List and download files of a visible ticket.
    ViewAttachments,
    /// Delete stored files.
    DeleteAttachment,

    // Directory
    /// Create, rename and deactivate companies.
    ManageCompanies,
    /// List and create users.
    ManageUsers,
    /// List support-role users.
    ListSupportUsers,

    // Read-only
    /// Modules, statuses and priorities.
    ViewReferenceData,
    /// Role-scoped dashboard statistics.
    ViewDashboard,
}

impl Permission {
    /// Every permission, used to build the admin set.
    pub const ALL: [Permission; 18] = [
        Self::ListTickets,
        Self::ViewTicket,
        Self::CreateTicket,
        Self::ChooseCompany,
        Self::AssignOnCreate,
        Self::UpdateTicket,
        Self::AssignTicket,
        Self::SetPriority,
        Self::ReopenToNew,
        Self::DeleteTicket,
        Self::UploadAttachment,
        Self::ViewAttachments,
        Self::DeleteAttachment,
        Self::ManageCompanies,
        Self::ManageUsers,
        Self::ListSupportUsers,
        Self::ViewReferenceData,
        Self::ViewDashboard,
    ];
}

/// Defines the mapping from each role to its set of allowed permissions.
#[derive(Debug, Clone)]
pub struct RbacPolicies {
    policies: HashMap<Role, HashSet<Permission>>,
}

impl RbacPolicies {
    /// Creates the default policy set.
    pub fn new() -> Self {
        let mut policies = HashMap::new();

        let shared = [
            Permission::ListTickets,
            Permission::ViewTicket,
            Permission::UploadAttachment,
            Permission::ViewAttachments,
            Permission::ListSupportUsers,
            Permission::ViewReferenceData,
            Permission::ViewDashboard,
        ];

        // Support: works tickets assigned to them
        let mut support: HashSet<Permission> = shared.into_iter().collect();
        support.insert(Permission::UpdateTicket);
        policies.insert(Role::Support, support);

        // Customer: opens tickets for their own company
        let mut customer: HashSet<Permission> = shared.into_iter().collect();
        customer.insert(Permission::CreateTicket);
        policies.insert(Role::Customer, customer);

        // Admin: everything
        policies.insert(Role::Admin, Permission::ALL.into_iter().collect());

        Self { policies }
    }

    /// Returns the set of permissions for the given role.
    pub fn permissions_for_role(&self, role: Role) -> HashSet<Permission> {
        self.policies.get(&role).cloned().unwrap_or_default()
    }

    /// Checks whether the given role has the specified permission.
    pub fn has_permission(&self, role: Role, permission: Permission) -> bool {
        self.policies
            .get(&role)
            .map(|perms| perms.contains(&permission))
            .unwrap_or(false)
    }
}

impl Default for RbacPolicies {
    fn default() -> Self {
        Self::new()
    }
}
