pub mod auth;
pub mod catalog;
pub mod data;
pub mod resource;
