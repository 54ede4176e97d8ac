pub mod dns;
pub mod domain;
pub mod fetch;
pub mod patterns;
pub mod phone;
pub mod smtp;
pub mod text;
