pub mod response;
pub mod user;

pub use self::{response::Response, user::User};
