use super::{Command, CommandError};
use crate::state::State;
use crate::storage::User;
use crate::util::validate_feed_url;

pub(super) async fn handler_feeds(state: &mut State, _cmd: Command) -> Result<(), CommandError> {
    let feeds = state.db.get_feeds_with_owners().await?;

    let out = state.out();
    if feeds.is_empty() {
        writeln!(out, "No feeds found.")?;
        return Ok(());
    }
    for entry in &feeds {
        writeln!(out, "Name: {}", entry.feed.name)?;
        writeln!(out, "URL: {}", entry.feed.url)?;
        writeln!(out, "Added by: {}", entry.owner_name)?;
    }
    Ok(())
}

/// Create a feed owned by `user` and follow it in one go.
pub(super) async fn handler_add_feed(
    state: &mut State,
    cmd: Command,
    user: User,
) -> Result<(), CommandError> {
    let name = cmd.arg(0, "name")?;
    // Stored as validated; lookups by URL match exactly
    let url = cmd.arg(1, "url")?.trim();
    validate_feed_url(url).map_err(|source| CommandError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;

    let feed = state.db.create_feed(name, url, user.id).await?;
    state.db.create_feed_follow(user.id, feed.id).await?;
    tracing::info!(feed_id = feed.id, feed = %feed.name, user = %user.name, "Added feed");

    let out = state.out();
    writeln!(out, "Feed added and followed successfully!")?;
    writeln!(out, "ID: {}", feed.id)?;
    writeln!(out, "Name: {}", feed.name)?;
    writeln!(out, "URL: {}", feed.url)?;
    writeln!(out, "User: {}", user.name)?;
    Ok(())
}

pub(super) async fn handler_follow(
    state: &mut State,
    cmd: Command,
    user: User,
) -> Result<(), CommandError> {
    let url = cmd.arg(0, "url")?.trim();
    let feed = state.db.get_feed_by_url(url).await?;
    state.db.create_feed_follow(user.id, feed.id).await?;
    tracing::info!(feed_id = feed.id, user = %user.name, "Followed feed");

    let out = state.out();
    writeln!(out, "Successfully followed the feed!")?;
    writeln!(out, "Feed: {}", feed.name)?;
    writeln!(out, "User: {}", user.name)?;
    Ok(())
}

pub(super) async fn handler_following(
    state: &mut State,
    _cmd: Command,
    user: User,
) -> Result<(), CommandError> {
    let follows = state.db.get_feed_follows_for_user(user.id).await?;

    let out = state.out();
    if follows.is_empty() {
        writeln!(out, "No feed follows found.")?;
        return Ok(());
    }
    writeln!(out, "Your followed feeds:")?;
    for follow in &follows {
        writeln!(out, " - {} ({})", follow.feed_name, follow.feed_url)?;
    }
    Ok(())
}

pub(super) async fn handler_unfollow(
    state: &mut State,
    cmd: Command,
    user: User,
) -> Result<(), CommandError> {
    let url = cmd.arg(0, "url")?.trim();
    let feed = state.db.get_feed_by_url(url).await?;
    let removed = state.db.delete_feed_follow(user.id, feed.id).await?;
    tracing::info!(feed_id = feed.id, user = %user.name, removed, "Unfollowed feed");

    if removed == 0 {
        writeln!(state.out(), "You were not following {}", url)?;
    } else {
        writeln!(state.out(), "Successfully unfollowed the feed: {}", url)?;
    }
    Ok(())
}
