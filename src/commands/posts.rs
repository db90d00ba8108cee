use super::{Command, CommandError};
use crate::state::State;

const DEFAULT_BROWSE_LIMIT: u32 = 2;

/// Parse the optional `browse` limit. Anything but a non-negative integer is
/// rejected before the store is queried.
fn parse_limit(arg: Option<&str>) -> Result<u32, CommandError> {
    match arg {
        None => Ok(DEFAULT_BROWSE_LIMIT),
        Some(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| CommandError::InvalidLimit(raw.to_string())),
    }
}

pub(super) async fn handler_browse(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let limit = parse_limit(cmd.args.first().map(String::as_str))?;
    let posts = state.db.get_posts(limit).await?;

    let out = state.out();
    for post in &posts {
        writeln!(out, "- {} ({})", post.title, post.url)?;
    }
    Ok(())
}
