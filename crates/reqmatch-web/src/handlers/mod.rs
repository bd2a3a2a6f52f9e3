pub mod admin;
pub mod documents;
pub mod health;
pub mod index;
pub mod upload;
