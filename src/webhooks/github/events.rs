use std::fmt::Display;

use serde::{de, Deserialize, Deserializer};
use serde_json::error::Category;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum StarAction {
    Created,
    Deleted,
    /// Any action GitHub may add later, acknowledged without a notification
    Other(String),
}

impl From<String> for StarAction {
    fn from(action: String) -> Self {
        match action.as_str() {
            "created" => Self::Created,
            "deleted" => Self::Deleted,
            _ => Self::Other(action),
        }
    }
}

impl Display for StarAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Deleted => write!(f, "deleted"),
            Self::Other(action) => write!(f, "{}", action),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GitHubUser {
    pub login: String,
}

#[derive(Debug, Deserialize)]
pub struct Repository {
    /// Kept exactly as GitHub sent it, only checked to be a URL
    #[serde(deserialize_with = "valid_url")]
    pub html_url: String,
}

fn valid_url<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let url = String::deserialize(deserializer)?;
    Url::parse(&url).map_err(|e| de::Error::custom(format!("invalid URL `{}`: {}", url, e)))?;
    Ok(url)
}

/// Payload of the `star` webhook, trimmed down to what we announce.
#[derive(Debug, Deserialize)]
pub struct StarEvent {
    pub action: StarAction,
    pub sender: GitHubUser,
    pub repository: Repository,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload isn't valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("payload isn't a star event: {0}")]
    Schema(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            Category::Data => Self::Schema(err),
            Category::Io | Category::Syntax | Category::Eof => Self::Json(err),
        }
    }
}

impl StarEvent {
    pub fn from_slice(payload: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(payload)?)
    }
}
