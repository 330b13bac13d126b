// src/civic/mod.rs

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Shown in a letter when the representative lookup comes back empty-handed.
pub const FIND_REPRESENTATIVES: &str =
    "You can find your representatives by visiting www.commoncause.org/take-action/find-elected-officials";

/// Chambers asked for: both houses of the national legislature.
static LEGISLATOR_ROLES: &[&str] = &["legislatorUpperBody", "legislatorLowerBody"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Official {
    pub name: String,
    #[serde(default)]
    pub party: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RepresentativeInfo {
    #[serde(default)]
    officials: Vec<Official>,
}

/// Outcome of a lookup as the letter sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Legislators {
    Found(Vec<Official>),
    Unavailable,
}

impl Legislators {
    /// Comma-separated names, or the "find your representatives" pointer.
    pub fn display(&self) -> String {
        match self {
            Legislators::Found(officials) if !officials.is_empty() => officials
                .iter()
                .map(|o| o.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            _ => FIND_REPRESENTATIVES.to_string(),
        }
    }
}

/// Decode the `officials` array of a representatives response body.
pub fn parse_officials(body: &str) -> Result<Vec<Official>> {
    let info: RepresentativeInfo =
        serde_json::from_str(body).context("decoding representatives response")?;
    Ok(info.officials)
}

/// Client for the civic information directory's representatives endpoint.
#[derive(Debug, Clone)]
pub struct CivicInfoClient {
    client: Client,
    base: Url,
    key: Option<String>,
}

impl CivicInfoClient {
    pub fn new(client: Client, base_url: &str, key: Option<String>) -> Result<Self> {
        let base =
            Url::parse(base_url).with_context(|| format!("parsing civic API URL {}", base_url))?;
        if base.cannot_be_a_base() {
            bail!("civic API URL {} cannot take a path", base_url);
        }
        Ok(Self { client, base, key })
    }

    /// `<base>/representatives?address=<zip>&levels=country&roles=...&key=<key>`
    pub fn representatives_url(&self, zipcode: &str) -> Result<Url> {
        let key = self
            .key
            .as_deref()
            .ok_or_else(|| anyhow!("no civic API key configured"))?;

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("civic API URL {} cannot take a path", self.base))?
            .pop_if_empty()
            .push("representatives");
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("address", zipcode);
            query.append_pair("levels", "country");
            for role in LEGISLATOR_ROLES {
                query.append_pair("roles", role);
            }
            query.append_pair("key", key);
        }
        Ok(url)
    }

    /// Federal legislators for a five-digit zip code. One attempt; any
    /// failure comes back as an error for the caller to fall back on.
    pub async fn legislators_by_zipcode(&self, zipcode: &str) -> Result<Vec<Official>> {
        let url = self.representatives_url(zipcode)?;
        let body = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET representatives for {}", zipcode))?
            .error_for_status()?
            .text()
            .await
            .with_context(|| format!("reading representatives body for {}", zipcode))?;
        parse_officials(&body)
    }
}
