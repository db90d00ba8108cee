use super::{Command, CommandError};
use crate::state::State;
use crate::storage::DatabaseError;

pub(super) async fn handler_login(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let name = cmd.arg(0, "name")?;
    let user = match state.db.get_user(name).await {
        Ok(user) => user,
        Err(DatabaseError::NotFound(_)) => return Err(CommandError::UnknownUser(name.to_string())),
        Err(e) => return Err(e.into()),
    };

    state.set_current_user(&user.name)?;
    tracing::info!(user = %user.name, "Logged in");
    writeln!(state.out(), "User '{}' successfully logged in.", user.name)?;
    Ok(())
}

pub(super) async fn handler_register(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let name = cmd.arg(0, "name")?;
    match state.db.get_user(name).await {
        Ok(_) => return Err(CommandError::UserExists(name.to_string())),
        Err(DatabaseError::NotFound(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let user = match state.db.create_user(name).await {
        Ok(user) => user,
        // Lost a race with another registration
        Err(DatabaseError::Conflict(_)) => return Err(CommandError::UserExists(name.to_string())),
        Err(e) => return Err(e.into()),
    };

    state.set_current_user(&user.name)?;
    tracing::info!(user = %user.name, id = user.id, "Registered user");

    let created = chrono::DateTime::from_timestamp_millis(user.created_at)
        .map(|t| t.to_rfc3339())
        .unwrap_or_default();
    let out = state.out();
    writeln!(out, "User '{}' successfully registered!", user.name)?;
    writeln!(out, "ID: {}", user.id)?;
    writeln!(out, "Created: {}", created)?;
    Ok(())
}

pub(super) async fn handler_reset(state: &mut State, _cmd: Command) -> Result<(), CommandError> {
    let removed = state.db.reset_users().await?;
    tracing::info!(users = removed, "Reset database");
    writeln!(state.out(), "Database successfully reset.")?;
    Ok(())
}

pub(super) async fn handler_users(state: &mut State, _cmd: Command) -> Result<(), CommandError> {
    let users = state.db.get_users().await?;
    let current = state.current_user().map(str::to_string);

    let out = state.out();
    for user in &users {
        if current.as_deref() == Some(user.name.as_str()) {
            writeln!(out, "* {} (current)", user.name)?;
        } else {
            writeln!(out, "* {}", user.name)?;
        }
    }
    Ok(())
}
