//! Approval roles: the ordered sign-off sequence at the foot of a form.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::FormError;

/// Name given to a role appended with [`ApprovalRoles::add_role`].
pub const DEFAULT_ROLE_NAME: &str = "New Role";

/// Opaque signature data attached to a role.
///
/// Only `image` is inspected: when present it must be base64, optionally
/// wrapped as a `data:<mime>;base64,` URL. Unknown keys are carried through
/// untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SignaturePayload {
    pub fn is_empty(&self) -> bool {
        self.image.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.signed_by.as_deref().map_or(true, |s| s.trim().is_empty())
            && self.signed_at.is_none()
            && self.extra.is_empty()
    }

    /// Check the image (if any) decodes as base64.
    pub fn check(&self) -> Result<(), FormError> {
        let Some(image) = self.image.as_deref() else {
            return Ok(());
        };
        let encoded = match image.strip_prefix("data:") {
            Some(rest) => {
                let (_, data) =
                    rest.split_once(";base64,")
                        .ok_or_else(|| FormError::InvalidSignature {
                            message: "data URL is not base64-encoded".to_string(),
                        })?;
                data
            }
            None => image,
        };
        BASE64
            .decode(encoded.trim())
            .map(|_| ())
            .map_err(|e| FormError::InvalidSignature {
                message: e.to_string(),
            })
    }
}

/// One slot in the sign-off sequence.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRole {
    pub role_name: String,
    #[serde(default)]
    pub data: SignaturePayload,
}

impl ApprovalRole {
    pub fn named(name: impl Into<String>) -> Self {
        ApprovalRole {
            role_name: name.into(),
            data: SignaturePayload::default(),
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.data.is_empty()
    }
}

/// Ordered list of approval roles. Role names need not be unique.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApprovalRoles {
    roles: Vec<ApprovalRole>,
}

impl ApprovalRoles {
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ApprovalRoles {
            roles: names.into_iter().map(ApprovalRole::named).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&ApprovalRole> {
        self.roles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ApprovalRole> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Indices of every role carrying `name`.
    pub fn positions_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = usize> + 'a {
        self.roles
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.role_name == name)
            .map(|(i, _)| i)
    }

    /// Append a role named [`DEFAULT_ROLE_NAME`] with an empty signature.
    pub fn add_role(&mut self) -> usize {
        self.roles.push(ApprovalRole::named(DEFAULT_ROLE_NAME));
        self.roles.len() - 1
    }

    pub fn remove_role(&mut self, index: usize) -> Result<ApprovalRole, FormError> {
        self.check_index(index)?;
        Ok(self.roles.remove(index))
    }

    pub fn rename_role(&mut self, index: usize, name: impl Into<String>) -> Result<(), FormError> {
        self.check_index(index)?;
        self.roles[index].role_name = name.into();
        Ok(())
    }

    pub fn set_signature(
        &mut self,
        index: usize,
        payload: SignaturePayload,
    ) -> Result<(), FormError> {
        self.check_index(index)?;
        payload.check()?;
        self.roles[index].data = payload;
        Ok(())
    }

    pub fn clear_signature(&mut self, index: usize) -> Result<(), FormError> {
        self.check_index(index)?;
        self.roles[index].data = SignaturePayload::default();
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), FormError> {
        if index < self.roles.len() {
            Ok(())
        } else {
            Err(FormError::RoleOutOfRange {
                index,
                len: self.roles.len(),
            })
        }
    }
}
