use std::convert::Infallible;

use rocket::{
    http::Status,
    request::{FromRequest, Outcome},
    Request, State,
};
use tracing::{debug, info, trace};

mod events;
pub use events::{StarAction, StarEvent};

mod signing;
use signing::SignedGitHubPayload;

use crate::notifier::{notify_star, Notifier};

const X_GITHUB_EVENT: &str = "X-GitHub-Event";

pub struct GitHubSecret(pub String);

#[rocket::post("/webhook", data = "<payload>")]
pub async fn github_webhook(
    event: GitHubEventType,
    payload: SignedGitHubPayload,
    notifier: &State<Box<dyn Notifier>>,
) -> Result<&'static str, (Status, String)> {
    trace!("received {:?} event with signed payload", event);

    match event {
        GitHubEventType::Star => {}
        GitHubEventType::Ping => {
            info!("received ping from GitHub, webhook is set up");
            return Ok("pong");
        }
        GitHubEventType::Other(name) => {
            debug!("ignoring `{}` event", name);
            return Ok("ignored");
        }
    }

    let event = StarEvent::from_slice(&payload.0).map_err(|e| {
        debug!("couldn't decode star event: {}", e);
        (Status::BadRequest, e.to_string())
    })?;

    if let StarAction::Other(action) = &event.action {
        debug!("ignoring star event with `{}` action", action);
        return Ok("ignored");
    }

    notify_star(notifier.inner().as_ref(), &event).await;

    Ok("OK")
}

/// Value of the `X-GitHub-Event` header.
///
/// Deliveries without the header are treated as star events, so plain signed POSTs keep working.
#[derive(Debug, PartialEq, Eq)]
pub enum GitHubEventType {
    Star,
    Ping,
    Other(String),
}

impl From<&str> for GitHubEventType {
    fn from(name: &str) -> Self {
        match name {
            "star" => Self::Star,
            "ping" => Self::Ping,
            other => Self::Other(other.to_owned()),
        }
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for GitHubEventType {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let event_type = match request.headers().get_one(X_GITHUB_EVENT) {
            Some(name) => GitHubEventType::from(name),
            None => {
                trace!("no {} header, assuming a star event", X_GITHUB_EVENT);
                GitHubEventType::Star
            }
        };

        Outcome::Success(event_type)
    }
}

#[cfg(test)]
pub(crate) use signing::sign;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_type_from_header() {
        assert_eq!(GitHubEventType::from("star"), GitHubEventType::Star);
        assert_eq!(GitHubEventType::from("ping"), GitHubEventType::Ping);
        assert_eq!(
            GitHubEventType::from("push"),
            GitHubEventType::Other("push".to_string())
        );
    }
}
