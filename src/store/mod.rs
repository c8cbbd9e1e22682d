pub mod event;
pub mod session;
pub mod user;

pub use event::EventRepository;
pub use session::SessionRepository;
pub use user::UserRepository;
