//! Mention strategy implementations.
//!
//! Each module provides a struct implementing [`crate::strategy::MentionStrategy`]
//! for one way of finding mentions on Reddit.

pub mod browser;
pub mod json_api;
pub mod listing;
pub mod subreddit;

pub use browser::BrowserStrategy;
pub use json_api::JsonApiStrategy;
pub use subreddit::SubredditSweepStrategy;
