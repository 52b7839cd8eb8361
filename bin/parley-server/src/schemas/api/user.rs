use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::store::User;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub created_at: String,
    pub last_login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
    pub total: usize,
}

impl User {
    pub fn to_response(&self) -> UserResponse {
        UserResponse {
            id: self.id.clone(),
            username: self.username.clone(),
            created_at: self.created_at.to_rfc3339(),
            last_login: self.last_login.to_rfc3339(),
        }
    }
}
