pub mod attendance;
pub mod groups;
pub mod invited_user;
pub mod leader;
pub mod meeting;
pub mod role;
pub mod scout;
pub mod user;
