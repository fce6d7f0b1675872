//! Program code catalog.

use std::collections::BTreeMap;

use anyhow::Context;

use super::ObsEndpoints;
use super::fallback::FALLBACK_PROGRAMS;
use super::parser::parse_program_options;
use crate::source::CatalogResolver;

/// Fewer live codes than this means the page changed; use the built-in table
const MIN_LIVE_PROGRAMS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Scraped from the live schedule page
    Remote,
    /// Built-in table
    Fallback,
}

/// Program code -> provider id map, immutable after loading
#[derive(Debug, Clone)]
pub struct ProgramCatalog {
    programs: BTreeMap<String, String>,
    origin: CatalogOrigin,
}

impl ProgramCatalog {
    pub fn new<I>(programs: I, origin: CatalogOrigin) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            programs: programs
                .into_iter()
                .map(|(code, id)| (code.trim().to_uppercase(), id))
                .collect(),
            origin,
        }
    }

    /// The built-in table
    pub fn fallback() -> Self {
        Self::new(
            FALLBACK_PROGRAMS
                .iter()
                .map(|(code, id)| (code.to_string(), id.to_string())),
            CatalogOrigin::Fallback,
        )
    }

    /// Load the live program list, falling back to the built-in table on any failure
    pub async fn load(client: &reqwest::Client, endpoints: &ObsEndpoints) -> Self {
        match Self::fetch(client, endpoints).await {
            Ok(Some(programs)) if programs.len() >= MIN_LIVE_PROGRAMS => {
                let catalog = Self::new(programs, CatalogOrigin::Remote);
                tracing::info!("Loaded {} program codes from {}", catalog.len(), endpoints.program_list_url);
                catalog
            }
            Ok(Some(programs)) => {
                tracing::warn!(
                    "Only {} program codes on the schedule page, using built-in table",
                    programs.len()
                );
                Self::fallback()
            }
            Ok(None) => {
                tracing::warn!("Program dropdown missing from schedule page, using built-in table");
                Self::fallback()
            }
            Err(e) => {
                tracing::warn!("Failed to load program codes: {:#}. Using built-in table", e);
                Self::fallback()
            }
        }
    }

    async fn fetch(
        client: &reqwest::Client,
        endpoints: &ObsEndpoints,
    ) -> anyhow::Result<Option<Vec<(String, String)>>> {
        tracing::debug!("Fetching program list from {}", endpoints.program_list_url);

        let response = client
            .get(&endpoints.program_list_url)
            .send()
            .await
            .context("Failed to fetch program list page")?;

        if !response.status().is_success() {
            anyhow::bail!("program list page returned HTTP {}", response.status());
        }

        let html = response
            .text()
            .await
            .context("Failed to read program list page body")?;

        Ok(parse_program_options(&html)?)
    }

    pub fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl CatalogResolver for ProgramCatalog {
    fn resolve(&self, program: &str) -> Option<String> {
        self.programs.get(&program.to_uppercase()).cloned()
    }

    fn program_codes(&self) -> Vec<String> {
        self.programs.keys().cloned().collect()
    }
}
