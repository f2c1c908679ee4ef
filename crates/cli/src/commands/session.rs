//! CLI session persistence.
//!
//! The engine keeps its session marker in memory; across CLI invocations
//! the marker survives as a small JSON file next to the cart file. Only
//! `login` fires the guest-cart merge - restoring a stored session must
//! not re-fire it.

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use tokri_core::UserId;
use tokri_engine::{SessionMode, Storefront};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    user_id: UserId,
}

fn session_file(engine: &Storefront) -> PathBuf {
    engine.config().data_dir.join("session.json")
}

/// Rehydrate a previously stored login, if any.
pub fn restore(engine: &Storefront) {
    let Ok(text) = fs::read_to_string(session_file(engine)) else {
        return;
    };
    match serde_json::from_str::<StoredSession>(&text) {
        Ok(stored) => engine.restore_session(SessionMode::Authenticated {
            user_id: stored.user_id,
        }),
        Err(e) => tracing::warn!(error = %e, "Ignoring corrupt session file"),
    }
}

/// Log in as a user and persist the session.
pub async fn login(engine: &Storefront, user_id: UserId) -> io::Result<()> {
    engine.login(user_id.clone()).await;

    let stored = StoredSession {
        user_id: user_id.clone(),
    };
    if let Some(parent) = session_file(engine).parent() {
        fs::create_dir_all(parent)?;
    }
    let body = serde_json::to_string(&stored).map_err(io::Error::other)?;
    fs::write(session_file(engine), body)?;

    info!(%user_id, "Logged in");
    Ok(())
}

/// Drop back to a guest session and forget the stored login.
pub fn logout(engine: &Storefront) -> io::Result<()> {
    engine.logout();

    match fs::remove_file(session_file(engine)) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    info!("Logged out");
    Ok(())
}
