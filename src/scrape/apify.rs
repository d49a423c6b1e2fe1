// src/scrape/apify.rs
//
// Scraper client: runs a hosted Apify actor against one search URL and reads
// back its dataset.
//
//   POST /v2/acts/{owner~name}/runs?waitForFinish=N   start, long-poll up to N s
//   GET  /v2/actor-runs/{id}?waitForFinish=N          repeat until terminal
//   GET  /v2/datasets/{id}/items?clean=true           the scraped items

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use crate::config::consts::{ACTOR_ID, APIFY_BASE, RUN_MAX_POLLS, RUN_WAIT_SECS};
use crate::config::Secrets;
use crate::core::net;
use crate::error::{Error, Result};

const SERVICE: &str = "Apify";

/// Anything that can turn a search URL into raw listing items.
pub trait ListingSource: Sync {
    fn fetch(&self, search_url: &Url, max_items: u32) -> Result<Vec<Value>>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::TimedOut | RunStatus::Aborted
        )
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRun {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub default_dataset_id: String,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub plan: Option<String>,
}

pub struct ApifyClient {
    http: Client,
    base: String,
    token: String,
    actor_id: String,
    wait_secs: u64,
    max_polls: u32,
}

impl ApifyClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base(APIFY_BASE, token)
    }

    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        Self::new(secrets.apify_token()?)
    }

    pub fn with_base(base: &str, token: &str) -> Result<Self> {
        Ok(Self {
            http: net::client()?,
            base: net::trim_base(base),
            token: token.to_string(),
            actor_id: ACTOR_ID.to_string(),
            wait_secs: RUN_WAIT_SECS,
            max_polls: RUN_MAX_POLLS,
        })
    }

    pub fn with_polling(mut self, wait_secs: u64, max_polls: u32) -> Self {
        self.wait_secs = wait_secs;
        self.max_polls = max_polls.max(1);
        self
    }

    pub fn with_actor(mut self, actor_id: &str) -> Self {
        self.actor_id = actor_id.to_string();
        self
    }

    /// API paths spell `owner/name` as `owner~name`.
    fn actor_path(&self) -> String {
        self.actor_id.replace('/', "~")
    }

    pub fn whoami(&self) -> Result<Account> {
        let resp = self
            .http
            .get(format!("{}/v2/users/me", self.base))
            .bearer_auth(&self.token)
            .send()?;
        let env: Envelope<Value> = net::json(SERVICE, resp)?;
        let username = env.data.get("username").and_then(Value::as_str).unwrap_or("Unknown");
        let plan = env.data.get("plan").and_then(|p| {
            p.get("name")
                .or_else(|| p.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        Ok(Account { username: username.to_string(), plan })
    }

    pub fn start_run(&self, input: &Value) -> Result<ActorRun> {
        tracing::debug!(actor = %self.actor_id, "starting actor run");
        let resp = self
            .http
            .post(format!("{}/v2/acts/{}/runs", self.base, self.actor_path()))
            .query(&[("waitForFinish", self.wait_secs)])
            .bearer_auth(&self.token)
            .json(input)
            .send()?;
        let env: Envelope<ActorRun> = net::json(SERVICE, resp)?;
        Ok(env.data)
    }

    /// Long-poll until the run reaches a terminal status; only SUCCEEDED is Ok.
    pub fn wait_for_run(&self, mut run: ActorRun) -> Result<ActorRun> {
        let mut polls = 0;
        while !run.status.is_terminal() {
            if polls >= self.max_polls {
                return Err(Error::Timeout {
                    what: format!("Actor run {}", run.id),
                    seconds: self.wait_secs * u64::from(self.max_polls),
                });
            }
            polls += 1;
            tracing::debug!(run = %run.id, status = ?run.status, polls, "waiting for actor run");
            let resp = self
                .http
                .get(format!("{}/v2/actor-runs/{}", self.base, run.id))
                .query(&[("waitForFinish", self.wait_secs)])
                .bearer_auth(&self.token)
                .send()?;
            let env: Envelope<ActorRun> = net::json(SERVICE, resp)?;
            run = env.data;
        }

        if run.status != RunStatus::Succeeded {
            return Err(Error::Actor { run_id: run.id, status: format!("{:?}", run.status) });
        }
        Ok(run)
    }

    pub fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let resp = self
            .http
            .get(format!("{}/v2/datasets/{}/items", self.base, dataset_id))
            .query(&[("clean", "true"), ("format", "json")])
            .bearer_auth(&self.token)
            .send()?;
        net::json(SERVICE, resp)
    }
}

impl ListingSource for ApifyClient {
    fn fetch(&self, search_url: &Url, max_items: u32) -> Result<Vec<Value>> {
        let input = json!({
            "startUrls": [{ "url": search_url.as_str() }],
            "maxItems": max_items,
            "proxy": { "useApifyProxy": true },
        });
        let run = self.start_run(&input)?;
        let run = self.wait_for_run(run)?;
        let items = self.dataset_items(&run.default_dataset_id)?;
        tracing::info!(run = %run.id, items = items.len(), "actor run finished");
        Ok(items)
    }
}
