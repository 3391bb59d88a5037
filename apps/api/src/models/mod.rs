pub mod evaluation;
pub mod user;
