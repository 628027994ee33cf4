use serde::Serialize;

use crate::auth::responses::UserItem;

#[derive(Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserItem>,
    pub total: i64,
}
