pub mod portal_api;
pub mod simple;
