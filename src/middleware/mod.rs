/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth: Bearer 認証 filter (拒否はしない)
 * - http: request id / trace / body limit / timeout
 */
pub mod auth;
pub mod http;
