use crate::error::{RosterResult, TowerSessionSnafu};
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Deserialize, Serialize};
use snafu::ResultExt;
use tower_sessions::Session;

pub mod store;

const FLASHES_KEY: &str = "roster.flashes";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashLevel {
    Success,
    Warning,
    Danger,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

/// One-shot messages kept in the visitor's session until the next page render picks them up.
#[derive(Debug, Clone)]
pub struct Flashes(Session);

impl Flashes {
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    pub async fn surface(&self, level: FlashLevel, message: impl Into<String>) -> RosterResult<()> {
        let mut pending: Vec<Flash> = self
            .0
            .get(FLASHES_KEY)
            .await
            .context(TowerSessionSnafu)?
            .unwrap_or_default();
        pending.push(Flash {
            level,
            message: message.into(),
        });

        self.0
            .insert(FLASHES_KEY, pending)
            .await
            .context(TowerSessionSnafu)
    }

    pub async fn take(&self) -> RosterResult<Vec<Flash>> {
        let pending: Option<Vec<Flash>> = self.0.get(FLASHES_KEY).await.context(TowerSessionSnafu)?;
        if pending.is_some() {
            //only touch the session when there's something to clear
            self.0
                .remove_value(FLASHES_KEY)
                .await
                .context(TowerSessionSnafu)?;

            //flashes are all we keep, so an emptied session is dropped from the store along with its cookie
            if self.0.is_empty().await {
                self.0.flush().await.context(TowerSessionSnafu)?;
            }
        }
        Ok(pending.unwrap_or_default())
    }
}

impl<S> FromRequestParts<S> for Flashes
where
    S: Send + Sync,
{
    type Rejection = <Session as FromRequestParts<S>>::Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state)
            .await
            .map(Self::new)
    }
}
