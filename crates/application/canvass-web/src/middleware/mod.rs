pub mod fallback;
pub mod session;

pub use session::{optional_user, require_auth, session_cookie, AuthUser};
