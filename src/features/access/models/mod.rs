mod principal;
mod role;
mod user;

pub use principal::{AccessScope, Permissions, Principal, Visibility};
pub use role::{Role, Rule};
pub use user::User;
