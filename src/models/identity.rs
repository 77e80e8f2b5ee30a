use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Consumer,
    Farmer,
    Driver,
}

/// Resolved caller identity, as handed over by the identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub phone: String,
    pub roles: Vec<Role>,
    pub active_role: Role,
}
