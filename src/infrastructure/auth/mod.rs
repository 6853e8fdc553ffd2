mod password;
mod token;

pub use password::{Argon2Hasher, PasswordHasher};
pub use token::{Claims, TokenService};
