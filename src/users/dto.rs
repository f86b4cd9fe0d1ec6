use serde::Deserialize;

/// What the identity provider hands over on sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityProfile {
    #[serde(alias = "subjectId")]
    pub clerk_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, alias = "profileImage")]
    pub avatar_url: Option<String>,
}

impl IdentityProfile {
    pub fn new(clerk_id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            clerk_id: clerk_id.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            avatar_url: None,
        }
    }
}
