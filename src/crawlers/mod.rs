pub mod controller;
pub mod crawler;
pub mod discover;
pub mod pagination;
pub mod web;

pub use crawler::BrowserSession;
pub use pagination::PaginationPolicy;
