//! Identity boundary: argon2 password hashing and the JWT session
//! token. The rest of the crate consumes only the resulting user id
//! and role.

mod password;
pub use password::{hash_password, verify_password};
mod jwt;
pub use jwt::{SessionClaims, generate_token, process_token};
mod error;
pub use error::{CryptError, CryptResult};
