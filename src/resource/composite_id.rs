//! Composite resource identifiers
//!
//! The external state layer stores one string per resource. Space-scoped
//! resources pack their space and id into it as `<space_id>/<resource_id>`.

use crate::error::{ProviderError, Result};
use std::fmt;
use std::str::FromStr;

pub const DELIMITER: char = '/';

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    pub space_id: String,
    pub resource_id: String,
}

impl CompositeId {
    /// Both parts must be non-empty and free of the delimiter
    pub fn new(space_id: impl Into<String>, resource_id: impl Into<String>) -> Result<Self> {
        let space_id = space_id.into();
        let resource_id = resource_id.into();
        check_part("space id", &space_id)?;
        check_part("resource id", &resource_id)?;
        Ok(Self {
            space_id,
            resource_id,
        })
    }
}

/// Check a space id on its own, before a resource id is known
pub fn validate_space(space_id: &str) -> Result<()> {
    check_part("space id", space_id)
}

fn check_part(label: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ProviderError::InvalidIdentifier(format!("{} is empty", label)));
    }
    if value.contains(DELIMITER) {
        return Err(ProviderError::InvalidIdentifier(format!(
            "{} '{}' contains '{}'",
            label, value, DELIMITER
        )));
    }
    Ok(())
}

impl fmt::Display for CompositeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.space_id, DELIMITER, self.resource_id)
    }
}

impl FromStr for CompositeId {
    type Err = ProviderError;

    fn from_str(token: &str) -> Result<Self> {
        let parts: Vec<&str> = token.split(DELIMITER).collect();
        match parts.as_slice() {
            [space, resource] if !space.is_empty() && !resource.is_empty() => Ok(Self {
                space_id: space.to_string(),
                resource_id: resource.to_string(),
            }),
            _ => Err(ProviderError::MalformedIdentifier(token.to_string())),
        }
    }
}

/// Encode a space and resource id into a single token
pub fn encode(space_id: &str, resource_id: &str) -> Result<String> {
    Ok(CompositeId::new(space_id, resource_id)?.to_string())
}

/// Split a token back into `(space_id, resource_id)`
pub fn decode(token: &str) -> Result<(String, String)> {
    let id: CompositeId = token.parse()?;
    Ok((id.space_id, id.resource_id))
}
