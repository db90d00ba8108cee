//! SQLite persistence for users, feeds, follows and posts.
//!
//! [`Database`] is a cheap-to-clone handle around a sqlx pool. Each file in
//! this module adds one group of operations to it.

mod feeds;
mod follows;
mod posts;
mod schema;
mod types;
mod users;

pub use schema::Database;
pub use types::{
    DatabaseError, Feed, FeedFollow, FeedWithOwner, FollowedFeed, NewPost, Post, User,
};
