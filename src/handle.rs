//! Compound identifiers for remote resources.
//!
//! Every managed resource is persisted under an opaque ID of the form
//! `<cloud-instance-id>/<resource-id>`. The handle is built once at creation
//! time and parsed back into its two parts on every later read or delete.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HandleError;

/// Separator between the scope and the resource ID.
pub const ID_SEPARATOR: char = '/';

/// Identifies one remote resource inside its parent cloud instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceHandle {
    /// Parent scope (the cloud instance ID).
    scope: String,
    /// Resource-specific identifier.
    resource_id: String,
}

impl ResourceHandle {
    /// Creates a handle from its two parts.
    ///
    /// # Errors
    ///
    /// Returns an error if either part is empty or contains `/`.
    pub fn new(scope: impl Into<String>, resource_id: impl Into<String>) -> Result<Self, HandleError> {
        let scope = scope.into();
        let resource_id = resource_id.into();

        validate_part("scope", &scope)?;
        validate_part("resource id", &resource_id)?;

        Ok(Self { scope, resource_id })
    }

    /// Parses an encoded `<scope>/<resource-id>` identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier does not contain exactly one
    /// separator with a non-empty part on each side.
    pub fn parse(id: &str) -> Result<Self, HandleError> {
        let malformed = || HandleError::Malformed { id: id.to_string() };

        let (scope, resource_id) = id.split_once(ID_SEPARATOR).ok_or_else(malformed)?;
        if scope.is_empty() || resource_id.is_empty() || resource_id.contains(ID_SEPARATOR) {
            return Err(malformed());
        }

        Ok(Self {
            scope: scope.to_string(),
            resource_id: resource_id.to_string(),
        })
    }

    /// Returns the parent scope (cloud instance ID).
    #[must_use]
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Returns the resource-specific identifier.
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Encodes the handle into its persisted form.
    #[must_use]
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

fn validate_part(part: &'static str, value: &str) -> Result<(), HandleError> {
    if value.is_empty() || value.contains(ID_SEPARATOR) {
        return Err(HandleError::InvalidPart {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{ID_SEPARATOR}{}", self.scope, self.resource_id)
    }
}

impl FromStr for ResourceHandle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ResourceHandle {
    type Error = HandleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ResourceHandle> for String {
    fn from(handle: ResourceHandle) -> Self {
        handle.encode()
    }
}
