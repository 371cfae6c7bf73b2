// VRV Access
// Copyright (C) 2025 Synerthink

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Directory operations guarded by the authorization gate

use super::models::{DepartmentFilter, DepartmentPatch, DepartmentRecord, NewUser, Record, RolePatch, RoleRecord, UserPatch, UserRecord};
use super::repository::{InMemoryRepository, Repository};
use super::seed::{seed_departments, seed_roles, seed_users};
use super::validation::DirectoryValidator;
use crate::error::{AccessError, AccessResult};
use crate::gate::AuthorizationGate;
use crate::models::Principal;
use crate::policy::Resource;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// User, role and department management.
///
/// Every call names the acting principal and is checked against the route policy entry of
/// the page that offers it: users need `users`, roles need `roles`, departments need
/// `departments`.
pub struct DirectoryService {
    gate: Arc<AuthorizationGate>,
    validator: DirectoryValidator,
    users: Arc<dyn Repository<UserRecord>>,
    roles: Arc<dyn Repository<RoleRecord>>,
    departments: Arc<dyn Repository<DepartmentRecord>>,
}

impl DirectoryService {
    pub fn new(
        gate: Arc<AuthorizationGate>,
        users: Arc<dyn Repository<UserRecord>>,
        roles: Arc<dyn Repository<RoleRecord>>,
        departments: Arc<dyn Repository<DepartmentRecord>>,
    ) -> AccessResult<Self> {
        Ok(Self {
            gate,
            validator: DirectoryValidator::new()?,
            users,
            roles,
            departments,
        })
    }

    /// In-memory directory filled with the demo records
    pub fn seeded(gate: Arc<AuthorizationGate>) -> AccessResult<Self> {
        Self::new(
            gate,
            Arc::new(InMemoryRepository::with_records(seed_users())),
            Arc::new(InMemoryRepository::with_records(seed_roles())),
            Arc::new(InMemoryRepository::with_records(seed_departments())),
        )
    }

    // Users

    pub async fn list_users(&self, actor: Option<&Principal>) -> AccessResult<Vec<UserRecord>> {
        self.gate.require(Resource::Users.id(), actor)?;
        self.users.list().await
    }

    pub async fn get_user(&self, actor: Option<&Principal>, id: &str) -> AccessResult<UserRecord> {
        self.gate.require(Resource::Users.id(), actor)?;
        self.users.get(id).await
    }

    /// Add a user. Emails are unique, compared case-insensitively.
    pub async fn create_user(&self, actor: Option<&Principal>, user: NewUser) -> AccessResult<UserRecord> {
        self.gate.require(Resource::Users.id(), actor)?;
        self.validator.validate_user(&user)?;
        self.ensure_email_free(&user.email, None).await?;

        let created = self.users.create(user.into_record(Utc::now().date_naive())).await?;
        info!(id = %created.id, email = %created.email, actor = %actor_email(actor), "Directory user created");
        Ok(created)
    }

    pub async fn update_user(&self, actor: Option<&Principal>, id: &str, patch: UserPatch) -> AccessResult<UserRecord> {
        self.gate.require(Resource::Users.id(), actor)?;

        let mut merged = self.users.get(id).await?;
        merged.apply(patch.clone());
        self.validator.validate_user(&NewUser::from(&merged))?;
        if patch.email.is_some() {
            self.ensure_email_free(&merged.email, Some(id)).await?;
        }

        let updated = self.users.update(id, patch).await?;
        info!(id = %id, actor = %actor_email(actor), "Directory user updated");
        Ok(updated)
    }

    pub async fn delete_user(&self, actor: Option<&Principal>, id: &str) -> AccessResult<()> {
        self.gate.require(Resource::Users.id(), actor)?;
        self.users.delete(id).await?;
        info!(id = %id, actor = %actor_email(actor), "Directory user deleted");
        Ok(())
    }

    async fn ensure_email_free(&self, email: &str, except_id: Option<&str>) -> AccessResult<()> {
        let email = email.trim();
        let taken = self.users.list().await?.iter().any(|user| Some(user.id.as_str()) != except_id && user.email.eq_ignore_ascii_case(email));

        if taken {
            return Err(AccessError::Conflict {
                message: format!("Email already exists: {}", email),
            });
        }
        Ok(())
    }

    // Roles

    pub async fn list_roles(&self, actor: Option<&Principal>) -> AccessResult<Vec<RoleRecord>> {
        self.gate.require(Resource::Roles.id(), actor)?;
        self.roles.list().await
    }

    pub async fn get_role(&self, actor: Option<&Principal>, id: &str) -> AccessResult<RoleRecord> {
        self.gate.require(Resource::Roles.id(), actor)?;
        self.roles.get(id).await
    }

    /// Add a role. The id of `role` is ignored and reassigned.
    pub async fn create_role(&self, actor: Option<&Principal>, role: RoleRecord) -> AccessResult<RoleRecord> {
        self.gate.require(Resource::Roles.id(), actor)?;
        self.validator.validate_role(&role)?;
        self.ensure_role_name_free(&role.name, None).await?;

        let created = self.roles.create(role).await?;
        info!(id = %created.id, name = %created.name, actor = %actor_email(actor), "Directory role created");
        Ok(created)
    }

    pub async fn update_role(&self, actor: Option<&Principal>, id: &str, patch: RolePatch) -> AccessResult<RoleRecord> {
        self.gate.require(Resource::Roles.id(), actor)?;

        let mut merged = self.roles.get(id).await?;
        merged.apply(patch.clone());
        self.validator.validate_role(&merged)?;
        if patch.name.is_some() {
            self.ensure_role_name_free(&merged.name, Some(id)).await?;
        }

        let updated = self.roles.update(id, patch).await?;
        info!(id = %id, actor = %actor_email(actor), "Directory role updated");
        Ok(updated)
    }

    /// Remove a role. Roles still held by a directory user cannot be removed.
    pub async fn delete_role(&self, actor: Option<&Principal>, id: &str) -> AccessResult<()> {
        self.gate.require(Resource::Roles.id(), actor)?;

        let role = self.roles.get(id).await?;
        let holders = self.users.list().await?.iter().filter(|user| user.role.as_str().eq_ignore_ascii_case(&role.name)).count();
        if holders > 0 {
            return Err(AccessError::Conflict {
                message: format!("Role {} is assigned to {} user(s)", role.name, holders),
            });
        }

        self.roles.delete(id).await?;
        info!(id = %id, actor = %actor_email(actor), "Directory role deleted");
        Ok(())
    }

    async fn ensure_role_name_free(&self, name: &str, except_id: Option<&str>) -> AccessResult<()> {
        let name = name.trim();
        let taken = self.roles.list().await?.iter().any(|role| Some(role.id.as_str()) != except_id && role.name.trim().eq_ignore_ascii_case(name));

        if taken {
            return Err(AccessError::Conflict {
                message: format!("Role already exists: {}", name),
            });
        }
        Ok(())
    }

    // Departments

    pub async fn list_departments(&self, actor: Option<&Principal>, filter: &DepartmentFilter) -> AccessResult<Vec<DepartmentRecord>> {
        self.gate.require(Resource::Departments.id(), actor)?;
        Ok(self.departments.list().await?.into_iter().filter(|department| filter.matches(department)).collect())
    }

    pub async fn get_department(&self, actor: Option<&Principal>, id: &str) -> AccessResult<DepartmentRecord> {
        self.gate.require(Resource::Departments.id(), actor)?;
        self.departments.get(id).await
    }

    pub async fn create_department(&self, actor: Option<&Principal>, department: DepartmentRecord) -> AccessResult<DepartmentRecord> {
        self.gate.require(Resource::Departments.id(), actor)?;
        self.validator.validate_department(&department)?;

        let created = self.departments.create(department).await?;
        info!(id = %created.id, name = %created.name, actor = %actor_email(actor), "Department created");
        Ok(created)
    }

    pub async fn update_department(&self, actor: Option<&Principal>, id: &str, patch: DepartmentPatch) -> AccessResult<DepartmentRecord> {
        self.gate.require(Resource::Departments.id(), actor)?;

        let mut merged = self.departments.get(id).await?;
        merged.apply(patch.clone());
        self.validator.validate_department(&merged)?;

        let updated = self.departments.update(id, patch).await?;
        info!(id = %id, actor = %actor_email(actor), "Department updated");
        Ok(updated)
    }

    /// Remove a department. Departments with employees cannot be removed.
    pub async fn delete_department(&self, actor: Option<&Principal>, id: &str) -> AccessResult<()> {
        self.gate.require(Resource::Departments.id(), actor)?;

        let department = self.departments.get(id).await?;
        if department.employee_count > 0 {
            return Err(AccessError::Conflict {
                message: format!("Cannot delete department {} with {} active employee(s)", department.name, department.employee_count),
            });
        }

        self.departments.delete(id).await?;
        info!(id = %id, actor = %actor_email(actor), "Department deleted");
        Ok(())
    }
}

fn actor_email(actor: Option<&Principal>) -> &str {
    actor.map(|principal| principal.email.as_str()).unwrap_or(crate::audit::ANONYMOUS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLogger;
    use crate::directory::models::RecordStatus;
    use crate::models::Role;
    use crate::policy::RoutePolicy;

    fn service() -> DirectoryService {
        let gate = Arc::new(AuthorizationGate::new(Arc::new(RoutePolicy::builtin()), Arc::new(AuditLogger::new())));
        DirectoryService::seeded(gate).unwrap()
    }

    fn principal(role: Role) -> Principal {
        Principal::new(format!("{}@vrv.com", role.as_str().to_lowercase()), "Someone", role, "IT")
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Dana Scully".to_string(),
            email: email.to_string(),
            role: Some(Role::Employee),
            department: "Research".to_string(),
            phone: None,
            location: "Washington, USA".to_string(),
        }
    }

    #[tokio::test]
    async fn test_listing_respects_policy() {
        let service = service();
        let admin = principal(Role::Admin);
        let manager = principal(Role::Manager);
        let employee = principal(Role::Employee);

        assert_eq!(service.list_users(Some(&admin)).await.unwrap().len(), 5);
        assert_eq!(service.list_users(Some(&manager)).await.unwrap().len(), 5);
        assert!(matches!(service.list_users(Some(&employee)).await, Err(AccessError::Forbidden { .. })));
        assert!(matches!(service.list_users(None).await, Err(AccessError::Unauthorized { .. })));

        assert_eq!(service.list_roles(Some(&admin)).await.unwrap().len(), 3);
        assert!(matches!(service.list_roles(Some(&manager)).await, Err(AccessError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_create_user_assigns_next_id() {
        let service = service();
        let admin = principal(Role::Admin);

        let created = service.create_user(Some(&admin), new_user("dana@vrv.com")).await.unwrap();
        assert_eq!(created.id, "USR006");
        assert_eq!(created.status, RecordStatus::Active);
        assert_eq!(service.get_user(Some(&admin), "USR006").await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let service = service();
        let admin = principal(Role::Admin);

        let err = service.create_user(Some(&admin), new_user("JOHN@vrv.com")).await.unwrap_err();
        assert!(matches!(err, AccessError::Conflict { .. }));

        let patch = UserPatch {
            email: Some("jane@vrv.com".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update_user(Some(&admin), "USR001", patch).await, Err(AccessError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_record_unchanged() {
        let service = service();
        let admin = principal(Role::Admin);

        let patch = UserPatch {
            name: Some("J".to_string()),
            ..Default::default()
        };
        assert!(matches!(service.update_user(Some(&admin), "USR001", patch).await, Err(AccessError::Validation { .. })));
        assert_eq!(service.get_user(Some(&admin), "USR001").await.unwrap().name, "John Doe");

        let patch = UserPatch {
            status: Some(RecordStatus::Inactive),
            ..Default::default()
        };
        assert_eq!(service.update_user(Some(&admin), "USR001", patch).await.unwrap().status, RecordStatus::Inactive);
    }

    #[tokio::test]
    async fn test_delete_missing_user_is_not_found() {
        let service = service();
        let err = service.delete_user(Some(&principal(Role::Manager)), "USR404").await.unwrap_err();
        assert!(matches!(err, AccessError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_role_in_use_cannot_be_deleted() {
        let service = service();
        let admin = principal(Role::Admin);

        assert!(matches!(service.delete_role(Some(&admin), "ROLE002").await, Err(AccessError::Conflict { .. })));

        let auditor = RoleRecord {
            id: String::new(),
            name: "Auditor".to_string(),
            description: "Read-only access to reports".to_string(),
            permissions: vec!["reports.view".to_string()],
            status: RecordStatus::Active,
        };
        let created = service.create_role(Some(&admin), auditor.clone()).await.unwrap();
        assert_eq!(created.id, "ROLE004");
        assert!(matches!(service.create_role(Some(&admin), auditor).await, Err(AccessError::Conflict { .. })));

        service.delete_role(Some(&admin), "ROLE004").await.unwrap();
        assert_eq!(service.list_roles(Some(&admin)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_departments_filter_and_delete_rules() {
        let service = service();
        let manager = principal(Role::Manager);

        let boston = DepartmentFilter {
            location: Some("Boston".to_string()),
            ..Default::default()
        };
        assert_eq!(service.list_departments(Some(&manager), &boston).await.unwrap().len(), 2);

        let inactive = DepartmentFilter {
            status: Some(RecordStatus::Inactive),
            ..Default::default()
        };
        let found = service.list_departments(Some(&manager), &inactive).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "DEPT006");

        assert!(matches!(service.delete_department(Some(&manager), "DEPT001").await, Err(AccessError::Conflict { .. })));
        service.delete_department(Some(&manager), "DEPT006").await.unwrap();
        assert!(matches!(service.get_department(Some(&manager), "DEPT006").await, Err(AccessError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_employee_cannot_touch_departments() {
        let service = service();
        let err = service.list_departments(Some(&principal(Role::Employee)), &DepartmentFilter::default()).await.unwrap_err();
        assert!(matches!(err, AccessError::Forbidden { .. }));
    }
}
