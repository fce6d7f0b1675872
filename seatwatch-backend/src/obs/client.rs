//! Seat query client for the schedule search endpoint.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue, REFERER};
use reqwest::{Client, StatusCode, Url};
use seatwatch_common::SeatStatus;
use std::time::Duration;

use super::ObsEndpoints;
use super::parser::parse_seat_table;
use crate::source::{QueryError, SeatSource};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Scrapes one program's schedule page per query
pub struct ObsClient {
    client: Client,
    endpoints: ObsEndpoints,
}

impl ObsClient {
    pub fn new(endpoints: ObsEndpoints) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("tr-TR,tr;q=0.9,en;q=0.8"));

        let client = Client::builder()
            .timeout(Duration::from_secs(endpoints.request_timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client, endpoints })
    }

    /// Shared HTTP client, also used for loading the program catalog
    pub fn http(&self) -> &Client {
        &self.client
    }

    pub fn endpoints(&self) -> &ObsEndpoints {
        &self.endpoints
    }

    fn search_url(&self, provider_id: &str) -> Result<Url, QueryError> {
        Url::parse_with_params(
            &self.endpoints.search_url,
            &[
                ("ProgramSeviyeTipiAnahtari", self.endpoints.level.as_str()),
                ("DersBransKoduId", provider_id),
            ],
        )
        .map_err(|e| QueryError::ConnectionFailure(format!("invalid search url: {}", e)))
    }
}

#[async_trait]
impl SeatSource for ObsClient {
    async fn query(&self, provider_id: &str, section: &str) -> Result<SeatStatus, QueryError> {
        let url = self.search_url(provider_id)?;
        tracing::debug!("Querying {} for section {}", url, section);

        let response = self
            .client
            .get(url)
            .header(REFERER, &self.endpoints.program_list_url)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(QueryError::UpstreamStatus(response.status().as_u16()));
        }

        let html = response.text().await?;
        tracing::debug!("Schedule page for program {}: {} bytes", provider_id, html.len());

        parse_seat_table(&html, section)
    }
}
