use std::io;

use hmac::{Hmac, Mac};
use rocket::{
    data::{ByteUnit, FromData, Outcome},
    http::Status,
    Data, Request,
};
use sha2::Sha256;
use thiserror::Error;
use tracing::trace;

use crate::webhooks::github::GitHubSecret;

const X_GITHUB_SIGNATURE: &str = "X-Hub-Signature-256";

type HmacSha256 = Hmac<Sha256>;

pub(crate) fn validate_signature(secret: &str, signature: &str, data: &[u8]) -> bool {
    trace!("validating signature...");

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => {
            trace!("couldn't create HMAC from secret");
            return false;
        }
    };

    mac.update(data);

    // GitHub puts a prefix in front of its hex SHA256
    let signature = match signature.strip_prefix("sha256=") {
        Some(s) => s,
        None => {
            trace!("couldn't strip prefix from signature `{}`", signature);
            return false;
        }
    };

    match hex::decode(signature) {
        // constant time comparison
        Ok(bytes) => mac.verify_slice(&bytes).is_ok(),
        Err(_) => {
            trace!("couldn't decode hex-encoded signature {}", signature);
            false
        }
    }
}

/// Why a payload was refused before reaching the handler.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,
    #[error("request header needs exactly one signature")]
    Duplicate,
    #[error("webhook secret isn't configured")]
    NoSecret,
    #[error("payload exceeds the {0} limit")]
    TooLarge(ByteUnit),
    #[error("couldn't read payload: {0}")]
    Read(#[from] io::Error),
    #[error("couldn't verify signature")]
    Mismatch,
}

impl SignatureError {
    pub fn status(&self) -> Status {
        match self {
            Self::Missing => Status::Unauthorized,
            Self::Duplicate => Status::BadRequest,
            Self::NoSecret | Self::Read(_) => Status::InternalServerError,
            Self::TooLarge(_) => Status::PayloadTooLarge,
            Self::Mismatch => Status::Forbidden,
        }
    }
}

/// Raw body of a request whose `X-Hub-Signature-256` header matched the configured secret.
pub struct SignedGitHubPayload(pub Vec<u8>);

const LIMIT: ByteUnit = ByteUnit::Mebibyte(1);

fn failure<'r>(error: SignatureError) -> Outcome<'r, SignedGitHubPayload> {
    trace!("rejecting GitHub payload: {}", error);
    Outcome::Error((error.status(), error))
}

// Tracking issue for chaining Data guards to avoid reimplementing all this:
// https://github.com/SergioBenitez/Rocket/issues/775
#[rocket::async_trait]
impl<'r> FromData<'r> for SignedGitHubPayload {
    type Error = SignatureError;

    async fn from_data(request: &'r Request<'_>, data: Data<'r>) -> Outcome<'r, Self> {
        trace!("received payload on GitHub webhook endpoint: {:?}", request);

        // checked before touching the body
        let signatures = request
            .headers()
            .get(X_GITHUB_SIGNATURE)
            .collect::<Vec<_>>();
        let signature = match signatures.as_slice() {
            [] => return failure(SignatureError::Missing),
            [signature] => *signature,
            _ => return failure(SignatureError::Duplicate),
        };

        let secret = match request.rocket().state::<GitHubSecret>() {
            Some(secret) => secret,
            None => return failure(SignatureError::NoSecret),
        };

        let size_limit = request.limits().get("json").unwrap_or(LIMIT);
        let content = match data.open(size_limit).into_bytes().await {
            Ok(bytes) if bytes.is_complete() => bytes.into_inner(),
            Ok(_) => return failure(SignatureError::TooLarge(size_limit)),
            Err(e) => return failure(e.into()),
        };

        if !validate_signature(&secret.0, signature, &content) {
            return failure(SignatureError::Mismatch);
        }

        trace!("validated GitHub payload");
        Outcome::Success(SignedGitHubPayload(content))
    }
}

/// Computes the header value GitHub would send for `data`.
#[cfg(test)]
pub(crate) fn sign(secret: &str, data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(data);
    format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
}
