use super::{Method, Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::{Certificate, Client};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

/// reqwest-backed transport. Keeps one client per CA bundle so verified calls reuse connections.
pub struct ReqwestTransport {
    default_client: Client,
    timeout: Option<Duration>,
    verified: Mutex<HashMap<PathBuf, Client>>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(None)
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        Ok(ReqwestTransport {
            default_client: builder.build()?,
            timeout,
            verified: Mutex::new(HashMap::new()),
        })
    }

    async fn client_for(&self, ca: Option<&Path>) -> Result<Client, TransportError> {
        let Some(ca) = ca else {
            return Ok(self.default_client.clone());
        };
        if let Some(client) = self.cached(ca) {
            return Ok(client);
        }
        let pem = tokio::fs::read(ca)
            .await
            .map_err(|e| TransportError::Certificate(format!("{}: {}", ca.display(), e)))?;
        let cert = Certificate::from_pem(&pem).map_err(|e| TransportError::Certificate(e.to_string()))?;
        let mut builder = Client::builder().add_root_certificate(cert);
        if let Some(t) = self.timeout {
            builder = builder.timeout(t);
        }
        let client = builder.build()?;
        if let Ok(mut cache) = self.verified.lock() {
            cache.insert(ca.to_path_buf(), client.clone());
        }
        Ok(client)
    }

    fn cached(&self, ca: &Path) -> Option<Client> {
        self.verified.lock().ok().and_then(|cache| cache.get(ca).cloned())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, method: Method, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let client = self.client_for(request.verify.as_deref()).await?;
        let mut builder = match method {
            Method::Get => client.get(&request.url),
            Method::Post => client.post(&request.url),
            Method::Put => client.put(&request.url),
            Method::Delete => client.delete(&request.url),
        };
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        tracing::debug!(%method, url = %request.url, status, "http exchange");
        Ok(TransportResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_params_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/widgets/"))
            .and(query_param("format", "json"))
            .and(header("Content-Type", "application/json"))
            .and(body_string(r#"{"name":"a"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id":7,"name":"a"}"#))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let mut request = TransportRequest::new(format!("{}/widgets/", server.uri()));
        request.params.insert("format".into(), "json".into());
        request.headers.insert("Content-Type".into(), "application/json".into());
        request.body = Some(br#"{"name":"a"}"#.to_vec());

        let response = transport.post(request).await.unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.text(), r#"{"id":7,"name":"a"}"#);
    }

    #[tokio::test]
    async fn error_statuses_are_responses() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/widgets/7/"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .delete(TransportRequest::new(format!("{}/widgets/7/", server.uri())))
            .await
            .unwrap();
        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn missing_ca_bundle_is_a_certificate_error() {
        let transport = ReqwestTransport::new().unwrap();
        let mut request = TransportRequest::new("https://localhost/");
        request.verify = Some(PathBuf::from("/nonexistent/ca.pem"));
        let err = transport.get(request).await.unwrap_err();
        assert!(matches!(err, TransportError::Certificate(_)));
    }
}
