//! HTTP client for the taniad API.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tania_common::{
    ChatRequest, ChatResponse, CommodityDetail, CommodityListResponse, DistributionDetail,
    ErrorBody, GeoSummary, HealthResponse, Pest, PestSearchRequest, RecentPestsResponse,
    VarietyListResponse, VarietyWithCommodity,
};

const DEFAULT_URL: &str = "http://127.0.0.1:7810";

/// Thin typed wrapper around the daemon's HTTP API.
pub struct TaniaClient {
    base_url: String,
    http: reqwest::Client,
}

impl TaniaClient {
    /// Resolve the daemon address.
    ///
    /// Priority: explicit --url flag, then $TANIAD_URL, then the default
    /// loopback address.
    pub fn new(explicit_url: Option<&str>) -> Self {
        let base_url = explicit_url
            .map(|u| u.to_string())
            .or_else(|| std::env::var("TANIAD_URL").ok())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn health(&self) -> Result<HealthResponse> {
        self.get("/v1/health", &[]).await
    }

    pub async fn regencies(&self, province_id: i64) -> Result<Vec<GeoSummary>> {
        self.get(
            "/v1/map/children",
            &[("province_id", province_id.to_string())],
        )
        .await
    }

    pub async fn districts(&self, regency_id: i64) -> Result<Vec<GeoSummary>> {
        self.get(
            "/v1/map/children",
            &[("regency_id", regency_id.to_string())],
        )
        .await
    }

    pub async fn distributions(
        &self,
        commodity_id: Option<i64>,
        province_id: Option<i64>,
        regency_id: Option<i64>,
        district_id: Option<i64>,
        year: Option<i64>,
    ) -> Result<Vec<DistributionDetail>> {
        let mut query = Vec::new();
        push_opt(&mut query, "commodity_id", commodity_id);
        push_opt(&mut query, "province_id", province_id);
        push_opt(&mut query, "regency_id", regency_id);
        push_opt(&mut query, "district_id", district_id);
        push_opt(&mut query, "year", year);
        self.get("/v1/map/distributions", &query).await
    }

    pub async fn search_pests(&self, req: &PestSearchRequest) -> Result<Vec<Pest>> {
        self.post("/v1/pest/search", req).await
    }

    pub async fn chat(&self, message: &str) -> Result<ChatResponse> {
        let req = ChatRequest {
            message: message.to_string(),
            context: None,
        };
        self.post("/v1/pest/chat", &req).await
    }

    pub async fn recent_pests(&self) -> Result<RecentPestsResponse> {
        self.get("/v1/pests/recent", &[]).await
    }

    pub async fn pest(&self, id: i64) -> Result<Pest> {
        self.get(&format!("/v1/pests/{}", id), &[]).await
    }

    pub async fn commodities(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        page: Option<u32>,
    ) -> Result<CommodityListResponse> {
        let mut query = Vec::new();
        push_opt(&mut query, "search", search.map(|s| s.to_string()));
        push_opt(&mut query, "category", category.map(|s| s.to_string()));
        push_opt(&mut query, "page", page);
        self.get("/v1/commodities", &query).await
    }

    pub async fn commodity(&self, id: i64) -> Result<CommodityDetail> {
        self.get(&format!("/v1/commodities/{}", id), &[]).await
    }

    pub async fn varieties(
        &self,
        commodity_id: Option<i64>,
        search: Option<&str>,
        page: Option<u32>,
    ) -> Result<VarietyListResponse> {
        let mut query = Vec::new();
        push_opt(&mut query, "commodity_id", commodity_id);
        push_opt(&mut query, "search", search.map(|s| s.to_string()));
        push_opt(&mut query, "page", page);
        self.get("/v1/varieties", &query).await
    }

    pub async fn variety(&self, id: i64) -> Result<VarietyWithCommodity> {
        self.get(&format!("/v1/varieties/{}", id), &[]).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| connect_error(&self.base_url, e))?;
        Self::decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| connect_error(&self.base_url, e))?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return response.json().await.context("malformed response body");
        }

        match response.json::<ErrorBody>().await {
            Ok(body) if status == StatusCode::UNPROCESSABLE_ENTITY => {
                let details: Vec<String> = body
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.field, e.message))
                    .collect();
                bail!("{} ({})", body.message, details.join("; "))
            }
            Ok(body) => bail!("{}", body.message),
            Err(_) => bail!("daemon returned {}", status),
        }
    }
}

fn push_opt<T: ToString>(query: &mut Vec<(&str, String)>, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        query.push((key, value.to_string()));
    }
}

fn connect_error(base_url: &str, e: reqwest::Error) -> anyhow::Error {
    if e.is_connect() {
        anyhow!(
            "Cannot reach taniad at {} - is the daemon running? ({})",
            base_url,
            e
        )
    } else {
        e.into()
    }
}
