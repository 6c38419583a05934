use serde::Serialize;

use super::repo::User;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub success: bool,
    pub count: i64,
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub success: bool,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct CountResponse {
    pub success: bool,
    pub count: i64,
}
