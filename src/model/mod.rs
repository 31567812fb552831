pub mod patient;
pub mod signup;
pub mod user;
