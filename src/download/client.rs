use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::time::Duration;

use super::retry::RetryPolicy;
use super::{ReferenceSource, SpeciesSource};
use crate::error::{Error, Result};
use crate::parser::{parse_name_list, parse_species, SpeciesData};
use crate::schema::EntityKind;

pub const DEFAULT_BASE_URL: &str = "https://pokeapi.co/api/v2";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking PokeAPI client serving both reference lists and species data
pub struct PokeApiClient {
    client: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl PokeApiClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("pokedex-sqlite")
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}/{}", self.base_url, path);
        self.retry.run(&url, || {
            tracing::debug!(url = %url, "GET");
            let response = self.client.get(&url).send()?;
            match response.status() {
                StatusCode::NOT_FOUND => Err(Error::NotFound(format!("{} returned 404", url))),
                status if !status.is_success() => Err(Error::Connectivity(format!(
                    "{} returned {}",
                    url, status
                ))),
                _ => Ok(response.text()?),
            }
        })
    }
}

fn list_path(kind: EntityKind) -> Result<&'static str> {
    match kind {
        EntityKind::Type => Ok("type?limit=100"),
        EntityKind::Ability => Ok("ability?limit=1000"),
        EntityKind::Pokemon => Ok("pokemon?limit=2000"),
        EntityKind::Trainer => Err(Error::Validation(
            "trainers have no reference list".to_string(),
        )),
    }
}

impl ReferenceSource for PokeApiClient {
    fn fetch_names(&self, kind: EntityKind) -> Result<Vec<String>> {
        let body = self.get_text(list_path(kind)?)?;
        let names = parse_name_list(&body)?;
        tracing::info!(kind = %kind, count = names.len(), "fetched reference names");
        Ok(names)
    }
}

impl SpeciesSource for PokeApiClient {
    fn fetch_species(&self, name: &str) -> Result<SpeciesData> {
        let slug = name.trim().to_lowercase().replace(' ', "-");
        let body = self.get_text(&format!("pokemon/{}", slug))?;
        parse_species(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trainers_have_no_list() {
        assert!(matches!(
            list_path(EntityKind::Trainer),
            Err(Error::Validation(_))
        ));
        assert_eq!(list_path(EntityKind::Type).unwrap(), "type?limit=100");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = PokeApiClient::with_base_url("http://localhost:9/api/").unwrap();
        assert_eq!(client.base_url, "http://localhost:9/api");
    }

    #[test]
    fn test_unreachable_host_is_connectivity_error() {
        let client = PokeApiClient::with_base_url("http://127.0.0.1:9")
            .unwrap()
            .with_retry(RetryPolicy {
                max_attempts: 1,
                base_delay_ms: 0,
            });
        assert!(matches!(
            client.fetch_species("pikachu"),
            Err(Error::Connectivity(_))
        ));
    }
}
