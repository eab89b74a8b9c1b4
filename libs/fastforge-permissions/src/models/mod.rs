//! Framework-provided models.

mod base;
mod user;

pub use base::ModelData;
pub use user::UserModel;
