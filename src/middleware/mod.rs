/// Middleware module
///
/// The authorization gate: bearer-token validation plus a composable role guard.

mod jwt_middleware;
mod role_guard;

pub use jwt_middleware::{bearer_token, AuthenticatedUser, JwtMiddleware};
pub use role_guard::RequireRole;
