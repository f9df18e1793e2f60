/*
 * Responsibility
 * - role → authorities の固定マッピング
 * - 認可側 (extractor/handler) はこの authority 文字列で判定する
 */
use std::collections::BTreeSet;

pub const ROLE_PREFIX: &str = "ROLE_";

/// One authority per role name: `"ADMIN"` → `{"ROLE_ADMIN"}`.
///
/// A role that already carries the prefix is taken as-is. A blank role grants nothing.
pub fn authorities_for_role(role: &str) -> BTreeSet<String> {
    let role = role.trim();
    if role.is_empty() {
        return BTreeSet::new();
    }

    let authority = if role.starts_with(ROLE_PREFIX) {
        role.to_string()
    } else {
        format!("{ROLE_PREFIX}{role}")
    };

    BTreeSet::from([authority])
}
