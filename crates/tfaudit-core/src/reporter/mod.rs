//! Consolidated GitHub issue reporting.
//!
//! All runs funnel into a single open issue identified by its exact title.
//! On update, any human-authored text above the first body header is kept
//! and only the machine-generated tail is replaced.

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use reqwest::{header, Method, RequestBuilder};
use serde::Deserialize;

use crate::errors::Error;
use crate::findings::{clean_path, Finding};

pub const ISSUE_TITLE: &str = "Generated schema validation";
pub const BODY_HEADER: &str = "### \n\n";

const API_BASE: &str = "https://api.github.com";
const CLIENT_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("tfaudit/", env!("CARGO_PKG_VERSION"));

/// Credentials and coordinates for the issue tracker, read from the ambient
/// environment. Any missing piece disables reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterConfig {
    pub owner: String,
    pub repo: String,
    pub token: String,
}

impl ReporterConfig {
    pub fn from_env() -> Option<Self> {
        let token = non_empty_var("GITHUB_TOKEN")?;
        let (owner, repo) = repo_info_from_env()?;
        Some(ReporterConfig { owner, repo, token })
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.is_empty())
}

fn repo_info_from_env() -> Option<(String, String)> {
    let owner = non_empty_var("GITHUB_REPOSITORY_OWNER");
    let name = non_empty_var("GITHUB_REPOSITORY_NAME");
    if let (Some(owner), Some(name)) = (owner, name) {
        return Some((owner, name));
    }
    parse_repository_slug(&non_empty_var("GITHUB_REPOSITORY")?)
}

/// Splits an `owner/name` slug.
pub fn parse_repository_slug(slug: &str) -> Option<(String, String)> {
    let (owner, name) = slug.split_once('/')?;
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some((owner.to_string(), name.to_string()))
}

#[derive(Debug, Deserialize)]
struct IssueSummary {
    number: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: Option<String>,
}

pub struct IssueReporter {
    config: ReporterConfig,
    client: reqwest::Client,
}

impl IssueReporter {
    pub fn new(config: ReporterConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Reporter(format!("failed to build http client: {e}")))?;
        Ok(IssueReporter { config, client })
    }

    /// Finds the tracker issue by title and patches it, or opens a fresh
    /// one. A run without findings reports nothing.
    pub async fn create_or_update_issue(&self, findings: &[Finding]) -> Result<(), Error> {
        if findings.is_empty() {
            return Ok(());
        }
        let generated = compose_issue_body(findings);
        match self.find_existing_issue().await? {
            Some(issue) => {
                let body =
                    merge_existing_body(issue.body.as_deref().unwrap_or_default(), &generated);
                self.update_issue(issue.number, &body).await
            }
            None => self.create_issue(&generated).await,
        }
    }

    async fn find_existing_issue(&self) -> Result<Option<IssueSummary>, Error> {
        let url = format!(
            "{API_BASE}/repos/{}/{}/issues?state=open",
            self.config.owner, self.config.repo
        );
        let response = self
            .request(Method::GET, &url)
            .send()
            .await
            .map_err(|e| Error::Reporter(format!("failed to list issues: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Reporter(format!("issue listing returned {}", response.status())));
        }
        let issues: Vec<IssueSummary> = response
            .json()
            .await
            .map_err(|e| Error::Reporter(format!("failed to decode issue listing: {e}")))?;
        Ok(issues.into_iter().find(|issue| issue.title == ISSUE_TITLE))
    }

    async fn update_issue(&self, number: u64, body: &str) -> Result<(), Error> {
        let url = format!(
            "{API_BASE}/repos/{}/{}/issues/{number}",
            self.config.owner, self.config.repo
        );
        let response = self
            .request(Method::PATCH, &url)
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await
            .map_err(|e| Error::Reporter(format!("failed to update issue #{number}: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Reporter(format!("issue update returned {}", response.status())));
        }
        Ok(())
    }

    async fn create_issue(&self, body: &str) -> Result<(), Error> {
        let url = format!("{API_BASE}/repos/{}/{}/issues", self.config.owner, self.config.repo);
        let response = self
            .request(Method::POST, &url)
            .json(&serde_json::json!({ "title": ISSUE_TITLE, "body": body }))
            .send()
            .await
            .map_err(|e| Error::Reporter(format!("failed to create issue: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::Reporter(format!("issue creation returned {}", response.status())));
        }
        Ok(())
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("token {}", self.config.token))
            .header(header::ACCEPT, "application/vnd.github.v3+json")
    }
}

/// Renders the machine-generated issue tail: the header followed by one
/// line per finding, deduplicated on the displayed (cleaned) path.
pub fn compose_issue_body(findings: &[Finding]) -> String {
    let mut seen = HashSet::new();
    let mut body = String::from(BODY_HEADER);
    for finding in findings {
        let key = (
            finding.resource_type.clone(),
            clean_path(&finding.path),
            finding.name.clone(),
            finding.is_block,
            finding.is_data_source,
            finding.submodule_name.clone(),
        );
        if seen.insert(key) {
            body.push_str(&format!("{finding}\n\n"));
        }
    }
    body
}

/// Keeps whatever precedes the first header in the existing body and
/// replaces the rest with the freshly generated tail.
pub fn merge_existing_body(existing: &str, generated: &str) -> String {
    let preamble = existing.splitn(2, BODY_HEADER).next().unwrap_or_default().trim();
    format!("{preamble}\n\n{generated}")
}
