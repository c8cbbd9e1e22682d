pub mod event;
pub mod user;

pub use event::{Category, EventFields, EventModel};
pub use user::{CurrentUser, UserModel};
