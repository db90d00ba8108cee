use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::{handler, Command, CommandError, Handler};
use crate::state::State;
use crate::storage::User;

/// Wrap a handler that needs the current user.
///
/// The returned handler reads the current user name from the config and
/// loads that user from the store before calling `inner`. With no user
/// logged in it fails with [`CommandError::NotLoggedIn`]; a lookup failure
/// (including a name the store does not know) is returned as is. In both
/// cases `inner` never runs.
///
/// The check trusts the local config file; it is not an access control.
pub fn logged_in<F>(inner: F) -> Handler
where
    F: for<'a> Fn(&'a mut State, Command, User) -> BoxFuture<'a, Result<(), CommandError>>
        + Send
        + Sync
        + 'static,
{
    let inner = Arc::new(inner);
    handler(move |state, command| {
        let inner = Arc::clone(&inner);
        async move {
            let name = state
                .current_user()
                .ok_or(CommandError::NotLoggedIn)?
                .to_string();
            let user = state.db.get_user(&name).await?;
            tracing::debug!(command = %command.name, user = %user.name, "Authenticated");
            inner(state, command, user).await
        }
        .boxed()
    })
}
