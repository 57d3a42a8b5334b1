use serde::{Deserialize, Serialize};

/// Capability granted by whatever access-control layer sits in front of the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessTier {
    #[default]
    Free,
    Premium,
}

impl AccessTier {
    pub fn is_premium(&self) -> bool {
        matches!(self, AccessTier::Premium)
    }
}

impl From<bool> for AccessTier {
    fn from(premium: bool) -> Self {
        if premium {
            AccessTier::Premium
        } else {
            AccessTier::Free
        }
    }
}
