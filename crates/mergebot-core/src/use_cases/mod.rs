pub mod events;
pub mod pulls;
