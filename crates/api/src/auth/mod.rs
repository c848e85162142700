pub mod jwt;
pub mod middleware;
pub mod permissions;

pub use jwt::{Claims, JwtService, Role};
pub use middleware::AuthMiddleware;
