pub mod coordinator;
pub mod errors;
pub mod messages;
mod worker;
