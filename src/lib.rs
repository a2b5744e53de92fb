pub mod classify;
pub mod config;
pub mod db;
pub mod discover;
pub mod document;
pub mod export;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod merge;
pub mod model;
pub mod pipeline;
pub mod queue;
pub mod research;
pub mod rules;
pub mod sitemap;
