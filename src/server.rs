use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::map_response;
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::Config;
use crate::extract::extract;
use crate::render::RenderClient;
use crate::rules::RuleSet;
use crate::Error;

#[derive(Clone)]
pub struct AppState {
    /// None when BROWSERLESS_TOKEN was not configured; requests then
    /// fail with an explicit 500.
    render: Option<RenderClient>,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let render = match config.token.as_deref() {
            Some(token) => Some(RenderClient::new(config.render_base_url.clone(), token)?),
            None => None,
        };
        Ok(AppState { render })
    }
}

/// Successful scrape payload: `{ url, extractedAt, data }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    pub url: String,
    pub extracted_at: DateTime<Utc>,
    pub data: Map<String, Value>,
}

/// JSON body accepted on POST (and any non-GET, non-OPTIONS method).
#[derive(Debug, Default, Deserialize)]
struct ScrapeBody {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    rules: Option<RuleSet>,
    #[serde(default)]
    ttl: Option<Value>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", any(scrape))
        .route("/api/scrape", any(scrape))
        .layer(map_response(set_cors))
        .with_state(state)
}

/// CORS headers go on every response, preflight and errors included.
async fn set_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    response
}

/// The one endpoint. Branches on method: OPTIONS answers the preflight,
/// GET reads query parameters, everything else reads a JSON body.
async fn scrape(
    State(state): State<AppState>,
    method: Method,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Result<Response, Error> {
    if method == Method::OPTIONS {
        return Ok(StatusCode::OK.into_response());
    }

    let (url, rules, ttl) = if method == Method::GET {
        let rules = match query.get("rules") {
            Some(raw) => Some(RuleSet::from_query_param(raw)?),
            None => None,
        };
        let ttl = query.get("ttl").and_then(|t| t.parse::<f64>().ok());
        (query.get("url").cloned(), rules, ttl)
    } else {
        let body: ScrapeBody = if body.is_empty() {
            ScrapeBody::default()
        } else {
            serde_json::from_slice(&body).map_err(|e| Error::InvalidBody(e.to_string()))?
        };
        (body.url, body.rules, ttl_seconds(body.ttl.as_ref()))
    };

    let url = url.filter(|u| !u.is_empty()).ok_or(Error::MissingParam("url"))?;
    let rules = rules.ok_or(Error::MissingParam("rules"))?;
    let render = state.render.as_ref().ok_or(Error::MissingToken)?;

    let html = render.fetch_rendered(&url).await?;
    let data = {
        let document = Html::parse_document(&html);
        extract(&document, &rules)
    };
    tracing::debug!(url = %url, keys = data.len(), "extraction complete");

    let out = ExtractionResponse {
        url,
        extracted_at: Utc::now(),
        data,
    };
    let mut response = Json(out).into_response();
    if let Some(ttl) = ttl.filter(|t| *t > 0.0) {
        let directive = format!("s-maxage={ttl}, stale-while-revalidate=60");
        if let Ok(value) = HeaderValue::from_str(&directive) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }
    Ok(response)
}

/// Body `ttl` tolerates both numbers and numeric strings.
fn ttl_seconds(ttl: Option<&Value>) -> Option<f64> {
    match ttl {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}
