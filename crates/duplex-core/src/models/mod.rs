pub mod artifact;
pub mod messages;
pub mod request;
