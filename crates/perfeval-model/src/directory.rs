//! Collaborator interfaces
//!
//! The workflow consumes three read-only collaborators: the department
//! directory, the indicator catalog and the role resolver. Real deployments
//! back these with the hosted database; [`InMemoryDirectory`] backs all three
//! for tests, the simulator and the CLI.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{DepartmentId, IndicatorId, OrganizationId, UserId};
use crate::status::ActorRole;

/// Department directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub organization_id: OrganizationId,
    pub name: String,
}

impl Department {
    pub fn new(
        id: impl Into<DepartmentId>,
        organization_id: impl Into<OrganizationId>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            name: name.into(),
        }
    }
}

/// Performance indicator offered for evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    pub id: IndicatorId,
    pub code: String,
    pub name: String,
}

impl Indicator {
    pub fn new(id: impl Into<IndicatorId>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Resolved acting user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: ActorRole,
    pub department_id: DepartmentId,
}

impl Actor {
    pub fn new(
        id: impl Into<UserId>,
        role: ActorRole,
        department_id: impl Into<DepartmentId>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            department_id: department_id.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn belongs_to(&self, department_id: &DepartmentId) -> bool {
        &self.department_id == department_id
    }
}

/// `departmentId -> {organizationId, name}`
pub trait DepartmentDirectory: Send + Sync {
    fn department(&self, id: &DepartmentId) -> Option<Department>;

    /// All departments of an organization, in directory order
    fn departments(&self, organization_id: &OrganizationId) -> Vec<Department>;
}

/// Ordered indicator list per organization
pub trait IndicatorCatalog: Send + Sync {
    fn indicators(&self, organization_id: &OrganizationId) -> Vec<Indicator>;

    fn contains(&self, organization_id: &OrganizationId, indicator_id: &IndicatorId) -> bool {
        self.indicators(organization_id)
            .iter()
            .any(|indicator| &indicator.id == indicator_id)
    }
}

/// `userId -> role + department`
pub trait RoleResolver: Send + Sync {
    fn resolve(&self, user_id: &UserId) -> Option<Actor>;
}

#[derive(Debug, Default)]
struct DirectoryData {
    departments: Vec<Department>,
    indicators: HashMap<OrganizationId, Vec<Indicator>>,
    actors: HashMap<UserId, Actor>,
}

/// In-memory directory implementing all three collaborator traits
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<DirectoryData>,
}

impl InMemoryDirectory {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a department
    pub fn add_department(&self, department: Department) {
        let mut data = self.inner.write();
        if let Some(existing) = data.departments.iter_mut().find(|d| d.id == department.id) {
            *existing = department;
        } else {
            data.departments.push(department);
        }
    }

    /// Append an indicator to an organization's catalog
    pub fn add_indicator(&self, organization_id: impl Into<OrganizationId>, indicator: Indicator) {
        self.inner
            .write()
            .indicators
            .entry(organization_id.into())
            .or_default()
            .push(indicator);
    }

    /// Add or replace a user
    pub fn add_actor(&self, actor: Actor) {
        self.inner.write().actors.insert(actor.id.clone(), actor);
    }

    /// Builder-style [`add_department`](Self::add_department)
    #[must_use]
    pub fn with_department(self, department: Department) -> Self {
        self.add_department(department);
        self
    }

    /// Builder-style [`add_indicator`](Self::add_indicator)
    #[must_use]
    pub fn with_indicator(self, organization_id: impl Into<OrganizationId>, indicator: Indicator) -> Self {
        self.add_indicator(organization_id, indicator);
        self
    }

    /// Builder-style [`add_actor`](Self::add_actor)
    #[must_use]
    pub fn with_actor(self, actor: Actor) -> Self {
        self.add_actor(actor);
        self
    }

    /// Ids of every department of an organization
    pub fn department_ids(&self, organization_id: &OrganizationId) -> Vec<DepartmentId> {
        self.departments(organization_id)
            .into_iter()
            .map(|d| d.id)
            .collect()
    }
}

impl DepartmentDirectory for InMemoryDirectory {
    fn department(&self, id: &DepartmentId) -> Option<Department> {
        self.inner
            .read()
            .departments
            .iter()
            .find(|d| &d.id == id)
            .cloned()
    }

    fn departments(&self, organization_id: &OrganizationId) -> Vec<Department> {
        self.inner
            .read()
            .departments
            .iter()
            .filter(|d| &d.organization_id == organization_id)
            .cloned()
            .collect()
    }
}

impl IndicatorCatalog for InMemoryDirectory {
    fn indicators(&self, organization_id: &OrganizationId) -> Vec<Indicator> {
        self.inner
            .read()
            .indicators
            .get(organization_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl RoleResolver for InMemoryDirectory {
    fn resolve(&self, user_id: &UserId) -> Option<Actor> {
        self.inner.read().actors.get(user_id).cloned()
    }
}
