use serde::Serialize;

use crate::api::v1::extractors::Principal;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub authorities: Vec<String>,
}

impl From<Principal> for MeResponse {
    fn from(p: Principal) -> Self {
        Self {
            user_id: p.user_id,
            email: p.email,
            role: p.role,
            authorities: p.authorities.into_iter().collect(),
        }
    }
}
