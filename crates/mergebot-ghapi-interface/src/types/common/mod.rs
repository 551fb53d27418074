mod branch;
mod label;
mod repository;
mod user;

pub use branch::GhBranch;
pub use label::GhLabel;
pub use repository::GhRepository;
pub use user::GhUser;
