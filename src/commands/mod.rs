//! Command registry and the built-in CLI commands.
//!
//! Every command is an async handler of the same shape, looked up by name:
//!
//! ```ignore
//! let commands = gator::commands::builtin();
//! commands.run(&mut state, Command::new("users", [])).await?;
//! ```
//!
//! Commands that act on behalf of a user are wrapped in
//! [`logged_in`](middleware::logged_in), which resolves the current user
//! before the handler runs.

mod agg;
mod feeds;
mod middleware;
mod posts;
mod users;

use std::collections::HashMap;

use futures::future::BoxFuture;
use futures::FutureExt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::feed::FetchError;
use crate::state::State;
use crate::storage::DatabaseError;

pub use agg::{format_duration, parse_duration};
pub use middleware::logged_in;

/// One invocation: the command name and its positional arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

impl Command {
    pub fn new<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Positional argument `index`, or a usage error naming it.
    fn arg(&self, index: usize, what: &str) -> Result<&str, CommandError> {
        self.args.get(index).map(String::as_str).ok_or_else(|| {
            CommandError::Usage(format!("{} requires <{}>", self.name, what))
        })
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(String),

    #[error("invalid limit {0:?}: expected a non-negative integer")]
    InvalidLimit(String),

    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("invalid feed URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: crate::util::UrlValidationError,
    },

    #[error("no user logged in")]
    NotLoggedIn,

    #[error("user {0:?} does not exist")]
    UnknownUser(String),

    #[error("user {0:?} already exists")]
    UserExists(String),

    #[error(transparent)]
    Store(#[from] DatabaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

/// A registered command body.
pub type Handler = Box<
    dyn for<'a> Fn(&'a mut State, Command) -> BoxFuture<'a, Result<(), CommandError>>
        + Send
        + Sync,
>;

/// Box a closure as a [`Handler`].
///
/// The bound pins the higher-ranked signature so closures such as
/// `|s, c| handler_users(s, c).boxed()` infer correctly.
pub fn handler<F>(f: F) -> Handler
where
    F: for<'a> Fn(&'a mut State, Command) -> BoxFuture<'a, Result<(), CommandError>>
        + Send
        + Sync
        + 'static,
{
    Box::new(f)
}

/// Name → handler table.
#[derive(Default)]
pub struct Commands {
    handlers: HashMap<String, Handler>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `handler`, replacing any earlier binding.
    pub fn register(&mut self, name: impl Into<String>, handler: Handler) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            tracing::debug!(command = %name, "Replaced command handler");
        }
    }

    /// Dispatch `command` to its handler.
    ///
    /// An unregistered name fails with [`CommandError::UnknownCommand`]
    /// before anything touches `state`.
    pub async fn run(&self, state: &mut State, command: Command) -> Result<(), CommandError> {
        let Some(handler) = self.handlers.get(&command.name) else {
            tracing::debug!(command = %command.name, known = ?self.names(), "Unknown command");
            return Err(CommandError::UnknownCommand(command.name));
        };
        tracing::debug!(command = %command.name, args = command.args.len(), "Running command");
        handler(state, command).await
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// The registry the `gator` binary runs with.
pub fn builtin() -> Commands {
    let mut commands = Commands::new();
    commands.register("login", handler(|s, c| users::handler_login(s, c).boxed()));
    commands.register("register", handler(|s, c| users::handler_register(s, c).boxed()));
    commands.register("reset", handler(|s, c| users::handler_reset(s, c).boxed()));
    commands.register("users", handler(|s, c| users::handler_users(s, c).boxed()));
    commands.register("agg", handler(|s, c| agg::handler_agg(s, c).boxed()));
    commands.register("feeds", handler(|s, c| feeds::handler_feeds(s, c).boxed()));
    commands.register(
        "addfeed",
        logged_in(|s, c, u| feeds::handler_add_feed(s, c, u).boxed()),
    );
    commands.register(
        "follow",
        logged_in(|s, c, u| feeds::handler_follow(s, c, u).boxed()),
    );
    commands.register(
        "following",
        logged_in(|s, c, u| feeds::handler_following(s, c, u).boxed()),
    );
    commands.register(
        "unfollow",
        logged_in(|s, c, u| feeds::handler_unfollow(s, c, u).boxed()),
    );
    commands.register("browse", handler(|s, c| posts::handler_browse(s, c).boxed()));
    commands
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_new_collects_args() {
        let cmd = Command::new("addfeed", ["Blog", "https://example.com/rss"]);
        assert_eq!(cmd.name, "addfeed");
        assert_eq!(cmd.args, vec!["Blog", "https://example.com/rss"]);
    }

    #[test]
    fn test_missing_arg_is_usage_error() {
        let cmd = Command::new("login", Vec::<String>::new());
        let err = cmd.arg(0, "name").unwrap_err();
        assert!(matches!(err, CommandError::Usage(_)));
        assert_eq!(err.to_string(), "usage: login requires <name>");
    }

    #[test]
    fn test_builtin_registers_every_command() {
        assert_eq!(
            builtin().names(),
            vec![
                "addfeed",
                "agg",
                "browse",
                "feeds",
                "follow",
                "following",
                "login",
                "register",
                "reset",
                "unfollow",
                "users",
            ]
        );
    }
}
