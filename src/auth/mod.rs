pub mod allowlist;
pub mod capability;
pub mod csrf;
pub mod middleware;
pub mod password;
pub mod role_cache;
pub mod session;
pub mod validate;
