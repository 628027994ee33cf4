use serde::Serialize;

use crate::models::users::User;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserItem {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<User> for UserItem {
    fn from(data: User) -> Self {
        Self {
            id: data.id,
            name: data.name,
            email: data.email,
            phone: data.phone,
            role: data.role,
            is_active: data.is_active,
            created_at: crate::utils::format_time_str(&data.created_at),
        }
    }
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: UserItem,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserItem,
}
