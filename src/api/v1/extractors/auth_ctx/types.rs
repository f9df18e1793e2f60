/*
 * Responsibility
 * - Handler から見える「認証済み主体 (Principal)」と、リクエスト単位の SecurityContext の型
 * - middleware が検証して request extensions に格納し、handler はこの型だけを受け取る
 *
 * Notes
 * - JWT の検証ロジックは services/auth 側の責務
 * - SecurityContext はリクエストの extensions と一緒に破棄される (グローバル/スレッドローカルは使わない)
 */
use std::collections::BTreeSet;

use crate::services::auth::{VerifiedClaims, authorities::authorities_for_role};

/// 認証済みのリクエストに付与される主体
///
/// - `user_id` は内部ユーザーID
/// - `authorities` は `role` から生成済み (生成後は不変)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: i64,
    pub email: String,
    pub role: String,
    pub authorities: BTreeSet<String>,
}

impl Principal {
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.contains(authority)
    }
}

impl From<VerifiedClaims> for Principal {
    fn from(claims: VerifiedClaims) -> Self {
        let authorities = authorities_for_role(&claims.role);
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            authorities,
        }
    }
}

/// Per-request slot holding at most one principal.
///
/// Once attached, a principal is never replaced or removed for the rest of the request.
#[derive(Debug, Clone, Default)]
pub struct SecurityContext {
    principal: Option<Principal>,
}

impl SecurityContext {
    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    pub fn has_authority(&self, authority: &str) -> bool {
        self.principal
            .as_ref()
            .is_some_and(|p| p.has_authority(authority))
    }

    /// Attach `principal` if the slot is empty. Hands it back otherwise.
    pub(crate) fn attach(&mut self, principal: Principal) -> Result<(), Principal> {
        if self.principal.is_some() {
            return Err(principal);
        }
        self.principal = Some(principal);
        Ok(())
    }
}
