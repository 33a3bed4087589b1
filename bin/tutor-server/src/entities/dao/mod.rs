pub mod message;
pub mod mood;
pub mod subject;
pub mod user;

pub use message::ChatMessage;
pub use mood::MoodLog;
pub use subject::Subject;
pub use user::User;
