use std::fmt::Write;

use tracing::{debug, info, trace, warn};

use crate::webhooks::github::{StarAction, StarEvent};

mod message_builder;
use message_builder::MessageBuilder;

mod slack;
pub use slack::SlackNotifier;

/// Delivers a text message to the configured chat channel.
#[rocket::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> anyhow::Result<()>;
}

/// One-line announcement for a star event, `None` for actions we don't announce.
///
/// The text goes through [`MessageBuilder`], so `&`, `<` and `>` (e.g. in a repository URL with
/// a query string) reach Slack escaped as `&amp;`, `&lt;` and `&gt;`. Slack renders them back as
/// the original characters.
pub fn star_message(event: &StarEvent) -> Option<String> {
    let verb = match event.action {
        StarAction::Created => "starred",
        StarAction::Deleted => "unstarred",
        StarAction::Other(_) => return None,
    };

    let mut message = MessageBuilder::new();
    write!(
        message,
        "{} {} {}",
        event.sender.login, verb, event.repository.html_url
    )
    .unwrap();

    Some(message.build())
}

/// Announces `event` through `notifier`. Delivery is best effort: failures are only logged.
pub async fn notify_star(notifier: &dyn Notifier, event: &StarEvent) {
    let message = match star_message(event) {
        Some(message) => message,
        None => {
            debug!("`{}` star action isn't announced", event.action);
            return;
        }
    };

    match event.action {
        StarAction::Created => info!("new star created by {}", event.sender.login),
        StarAction::Deleted => info!("star deleted by {}", event.sender.login),
        StarAction::Other(_) => {}
    }

    trace!("sending message `{}`", message);

    match notifier.send(&message).await {
        Ok(()) => info!("notification sent for {} star event", event.action),
        Err(e) => warn!("couldn't send notification for {} star event: {:#}", event.action, e),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;

    use super::Notifier;

    /// Keeps every message instead of sending it.
    #[derive(Clone, Default)]
    pub(crate) struct RecordingNotifier(Arc<Mutex<Vec<String>>>);

    impl RecordingNotifier {
        pub(crate) fn sent(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[rocket::async_trait]
    impl Notifier for RecordingNotifier {
        async fn send(&self, text: &str) -> anyhow::Result<()> {
            self.0.lock().unwrap().push(text.to_owned());
            Ok(())
        }
    }

    pub(crate) struct FailingNotifier;

    #[rocket::async_trait]
    impl Notifier for FailingNotifier {
        async fn send(&self, _text: &str) -> anyhow::Result<()> {
            Err(anyhow!("channel_not_found"))
        }
    }
}
