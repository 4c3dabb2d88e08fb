pub mod email;
pub mod user;

pub use email::{Email, EmailIdRequest, EmailStatus, SendEmailRequest};
pub use user::{CreateUserRequest, Role, UpdateUserRequest, User, UserIdRequest};
