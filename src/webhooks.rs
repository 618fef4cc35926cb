use rocket::{
    http::{Method, Status},
    route::{self, Handler},
    routes, Build, Data, Request, Rocket, Route,
};
use tracing::trace;

pub mod github;
use github::{github_webhook, GitHubSecret};

use crate::{config::StargazerConfig, notifier::Notifier};

const WEBHOOK_PATH: &str = "/webhook";

/// Answers 405 on the webhook path for every method but POST, without reading the body.
#[derive(Clone)]
struct MethodNotAllowed;

#[rocket::async_trait]
impl Handler for MethodNotAllowed {
    async fn handle<'r>(&self, request: &'r Request<'_>, _data: Data<'r>) -> route::Outcome<'r> {
        trace!("{} isn't allowed on {}", request.method(), request.uri());
        route::Outcome::Error(Status::MethodNotAllowed)
    }
}

fn method_not_allowed() -> Vec<Route> {
    // HEAD falls back to the GET route
    [
        Method::Get,
        Method::Put,
        Method::Delete,
        Method::Options,
        Method::Trace,
        Method::Connect,
        Method::Patch,
    ]
    .into_iter()
    .map(|method| Route::new(method, WEBHOOK_PATH, MethodNotAllowed))
    .collect()
}

/// Builds the webhook server around an already constructed [`Notifier`].
pub fn build_rocket(config: &StargazerConfig, notifier: Box<dyn Notifier>) -> Rocket<Build> {
    let figment = rocket::Config::figment()
        .merge(("address", config.address))
        .merge(("port", config.port));

    rocket::custom(figment)
        .mount("/", routes![github_webhook])
        .mount("/", method_not_allowed())
        .manage(GitHubSecret(config.webhook_secret.clone()))
        .manage(notifier)
}
