use async_trait::async_trait;
use onelogin_config::ProviderConfig;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use url::Url;

use crate::api::{OneLoginApi, extract_id};
use crate::auth::TokenSource;
use crate::collection::Collection;
use crate::error::{ApiError, ApiResult};

/// OneLogin REST client authenticated with client credentials
#[derive(Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: TokenSource,
}

impl HttpClient {
    pub fn new(config: &ProviderConfig) -> ApiResult<Self> {
        config.validate()?;
        let mut base_url = config.api_base_url()?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("onelogin-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let tokens = TokenSource::new(
            &base_url,
            config.client_id.clone(),
            config.client_secret.clone(),
        )?;

        Ok(Self {
            http,
            base_url,
            tokens,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, path: &str) -> ApiResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ApiError::transport(format!("invalid request path {path}: {e}")))
    }

    fn item_path(collection: &Collection, id: &str) -> String {
        format!("{}/{id}", collection.path())
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> ApiResult<(StatusCode, String)> {
        let url = self.url(path)?;
        let token = self.tokens.access_token(&self.http).await?;

        tracing::debug!(%method, %url, "sending OneLogin API request");
        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(reqwest::header::ACCEPT, "application/json");
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        let status = resp.status();
        if status == StatusCode::UNAUTHORIZED {
            self.tokens.invalidate();
        }
        let text = resp.text().await?;
        Ok((status, text))
    }
}

fn parse_body(text: &str) -> ApiResult<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text)
        .map_err(|e| ApiError::decode(format!("Failed to parse response JSON: {e}")))
}

/// Unwraps `{"status": {..}, "data": [obj]}` envelopes of the v1 API.
fn unwrap_v1(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("status") && map.contains_key("data") => {
            match map.remove("data") {
                Some(Value::Array(mut items)) if items.len() == 1 => items.remove(0),
                Some(other) => other,
                None => Value::Null,
            }
        }
        other => other,
    }
}

fn handle_response(collection: &Collection, status: StatusCode, text: String) -> ApiResult<Value> {
    if !status.is_success() {
        return Err(ApiError::status(status.as_u16(), text));
    }
    let body = parse_body(&text)?;
    Ok(if collection.is_v1() {
        unwrap_v1(body)
    } else {
        body
    })
}

#[async_trait]
impl OneLoginApi for HttpClient {
    async fn get(&self, collection: &Collection, id: &str) -> ApiResult<Option<Value>> {
        let (status, text) = self
            .send(Method::GET, &Self::item_path(collection, id), &[], None)
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        match handle_response(collection, status, text)? {
            Value::Null => Ok(None),
            body => Ok(Some(body)),
        }
    }

    async fn list(
        &self,
        collection: &Collection,
        query: &[(String, String)],
    ) -> ApiResult<Vec<Value>> {
        let (status, text) = self
            .send(Method::GET, &collection.path(), query, None)
            .await?;
        match handle_response(collection, status, text)? {
            Value::Null => Ok(Vec::new()),
            Value::Array(items) => Ok(items),
            other => Err(ApiError::decode(format!("expected a list, got {other}"))),
        }
    }

    async fn create(&self, collection: &Collection, body: &Value) -> ApiResult<Value> {
        let (status, text) = self
            .send(Method::POST, &collection.path(), &[], Some(body))
            .await?;
        if !status.is_success() {
            // Some endpoints create the object and then fail a follow-up step.
            if let Ok(partial) = parse_body(&text)
                && extract_id(&partial).is_some()
            {
                return Err(ApiError::partial_success(
                    partial,
                    format!("status: {}, body: {text}", status.as_u16()),
                ));
            }
        }
        handle_response(collection, status, text)
    }

    async fn update(&self, collection: &Collection, id: &str, body: &Value) -> ApiResult<Value> {
        let (status, text) = self
            .send(Method::PUT, &Self::item_path(collection, id), &[], Some(body))
            .await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(Value::Null);
        }
        handle_response(collection, status, text)
    }

    async fn delete(&self, collection: &Collection, id: &str) -> ApiResult<()> {
        let (status, text) = self
            .send(Method::DELETE, &Self::item_path(collection, id), &[], None)
            .await?;
        handle_response(collection, status, text).map(|_| ())
    }

    async fn remove(&self, collection: &Collection, body: &Value) -> ApiResult<()> {
        let (status, text) = self
            .send(Method::DELETE, &collection.path(), &[], Some(body))
            .await?;
        handle_response(collection, status, text).map(|_| ())
    }
}
