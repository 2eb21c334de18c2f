//! Identifier newtypes
//!
//! Record ids are ULIDs so they sort by creation time. Everything owned by an
//! external collaborator (organizations, departments, users, indicators) is an
//! opaque string key handed to us by that collaborator.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique evaluation record identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Ulid);

impl RecordId {
    /// Generate new record ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a collaborator-supplied key
            #[inline]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Borrow the raw key
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Organization (municipality) key
    OrganizationId
);
string_id!(
    /// Department key from the department directory
    DepartmentId
);
string_id!(
    /// User key from the role resolver
    UserId
);
string_id!(
    /// Performance indicator key from the indicator catalog
    IndicatorId
);

/// Fiscal year, stored as the plain calendar year number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FiscalYear(pub i32);

impl fmt::Display for FiscalYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for FiscalYear {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

/// Uniqueness key of an evaluation record
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    pub organization_id: OrganizationId,
    pub fiscal_year: FiscalYear,
    pub department_id: DepartmentId,
}

impl RecordKey {
    pub fn new(
        organization_id: impl Into<OrganizationId>,
        fiscal_year: impl Into<FiscalYear>,
        department_id: impl Into<DepartmentId>,
    ) -> Self {
        Self {
            organization_id: organization_id.into(),
            fiscal_year: fiscal_year.into(),
            department_id: department_id.into(),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.organization_id, self.fiscal_year, self.department_id
        )
    }
}
