use std::{
    env,
    fs::File,
    io::BufReader,
    net::{IpAddr, Ipv4Addr},
    path::Path,
    time::Duration,
};

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::debug;
use url::Url;

const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api/";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct StargazerConfig {
    /// Secret shared with GitHub, used to check the `X-Hub-Signature-256` header
    pub webhook_secret: String,
    /// Bot token used to authenticate against the Slack Web API
    pub slack_token: String,
    /// Channel (name or ID) where star notifications are posted
    pub slack_channel: String,
    /// Base URL of the Slack Web API
    #[serde(default = "default_slack_api_url")]
    pub slack_api_url: Url,
    /// Address the webhook server listens on
    #[serde(default = "default_address")]
    pub address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Give up on a Slack call after this many seconds
    #[serde(default = "default_notify_timeout_secs")]
    pub notify_timeout_secs: u64,
}

fn default_slack_api_url() -> Url {
    Url::parse(DEFAULT_SLACK_API_URL).expect("default Slack API URL is valid")
}

fn default_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_notify_timeout_secs() -> u64 {
    DEFAULT_NOTIFY_TIMEOUT_SECS
}

impl StargazerConfig {
    /// Reads the configuration from a YAML file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let config_file =
            File::open(path).with_context(|| format!("couldn't open {}", path.display()))?;
        let config: Self = serde_yaml::from_reader(BufReader::new(config_file))
            .context("couldn't parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Loads variables from a dotenv file into the process environment, without overriding the
    /// ones already set. Returns `false` if there is no such file.
    pub fn load_env_file(path: &Path) -> anyhow::Result<bool> {
        match dotenvy::from_path(path) {
            Ok(()) => {
                debug!("loaded environment from {}", path.display());
                Ok(true)
            }
            Err(e) if e.not_found() => {
                debug!("no {} file, using the environment as is", path.display());
                Ok(false)
            }
            Err(e) => Err(e).with_context(|| format!("couldn't load {}", path.display())),
        }
    }

    /// Reads the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |name: &str| lookup(name).with_context(|| format!("{} must be set", name));

        let slack_api_url = match lookup("SLACK_API_URL") {
            Some(url) => Url::parse(&url).context("SLACK_API_URL isn't a valid URL")?,
            None => default_slack_api_url(),
        };
        let address = match lookup("STARGAZER_ADDRESS") {
            Some(address) => address
                .parse()
                .context("STARGAZER_ADDRESS isn't a valid IP address")?,
            None => default_address(),
        };
        let port = match lookup("STARGAZER_PORT") {
            Some(port) => port.parse().context("STARGAZER_PORT isn't a valid port")?,
            None => DEFAULT_PORT,
        };
        let notify_timeout_secs = match lookup("NOTIFY_TIMEOUT_SECS") {
            Some(secs) => secs
                .parse()
                .context("NOTIFY_TIMEOUT_SECS isn't a number of seconds")?,
            None => DEFAULT_NOTIFY_TIMEOUT_SECS,
        };

        let config = Self {
            webhook_secret: required("WEBHOOK_SECRET")?,
            slack_token: required("SLACK_TOKEN")?,
            slack_channel: required("SLACK_CHANNEL")?,
            slack_api_url,
            address,
            port,
            notify_timeout_secs,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.webhook_secret.trim().is_empty() {
            bail!("webhook secret can't be empty");
        }
        if self.slack_token.trim().is_empty() {
            bail!("Slack token can't be empty");
        }
        if self.slack_channel.trim().is_empty() {
            bail!("Slack channel can't be empty");
        }

        Ok(())
    }

    pub fn notify_timeout(&self) -> Duration {
        Duration::from_secs(self.notify_timeout_secs)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> StargazerConfig {
    StargazerConfig {
        webhook_secret: "It's a Secret to Everybody".to_string(),
        slack_token: "xoxb-test".to_string(),
        slack_channel: "#stars".to_string(),
        slack_api_url: default_slack_api_url(),
        address: default_address(),
        port: DEFAULT_PORT,
        notify_timeout_secs: DEFAULT_NOTIFY_TIMEOUT_SECS,
    }
}
