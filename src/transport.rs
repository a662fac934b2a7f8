//! GraphQL over HTTP
//!
//! The `Transport` trait is the only seam between the CLI and the network.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::dispatch::Variables;
use crate::error::DispatchError;

/// One GraphQL request, serialized as the standard POST body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: &'a Variables,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<&'a str>,
}

/// Executes a request against a remote endpoint and returns the raw payload.
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn execute(&self, request: &GraphQlRequest<'_>) -> Result<Vec<u8>, DispatchError>;
}

/// `Transport` posting JSON to a single GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    url: String,
}

impl HttpTransport {
    /// Without a `timeout` a request only ends when the server answers or the
    /// caller drops it.
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, DispatchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(DispatchError::ClientBuild)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[derive(Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Box<RawValue>>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

impl Transport for HttpTransport {
    /// Returns the `data` member verbatim; a response carrying `errors` is a
    /// failure even when it also has data.
    async fn execute(&self, request: &GraphQlRequest<'_>) -> Result<Vec<u8>, DispatchError> {
        tracing::debug!(
            url = %self.url,
            operation = request.operation_name.unwrap_or_default(),
            "sending request"
        );

        let resp = self
            .client
            .post(self.url.as_str())
            .json(request)
            .send()
            .await
            .map_err(DispatchError::RequestFailed)?;
        let status = resp.status();
        let body = resp.bytes().await.map_err(DispatchError::ResponseRead)?;

        if !status.is_success() {
            return Err(DispatchError::HttpError {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let response: GraphQlResponse =
            serde_json::from_slice(&body).map_err(DispatchError::InvalidResponse)?;
        let errors = response.errors.unwrap_or_default();
        if !errors.is_empty() {
            return Err(DispatchError::GraphQl {
                messages: errors.into_iter().map(|e| e.message).collect(),
            });
        }

        Ok(match response.data {
            Some(data) => data.get().as_bytes().to_vec(),
            None => b"null".to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::VariableValue;
    use serde_json::json;

    fn variables() -> Variables {
        let mut vars = Variables::new();
        vars.insert("id".into(), VariableValue::Int(5));
        vars.insert("_".into(), VariableValue::List(Vec::new()));
        vars
    }

    #[test]
    fn request_serializes_as_graphql_post_body() {
        let vars = variables();
        let req = GraphQlRequest {
            query: "query GetUser { a }",
            variables: &vars,
            operation_name: Some("GetUser"),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "query": "query GetUser { a }",
                "variables": {"id": 5, "_": []},
                "operationName": "GetUser",
            })
        );
    }

    #[test]
    fn request_omits_missing_operation_name() {
        let vars = Variables::new();
        let req = GraphQlRequest {
            query: "{ a }",
            variables: &vars,
            operation_name: None,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert!(value.get("operationName").is_none());
    }

    #[tokio::test]
    async fn execute_posts_request_and_returns_raw_data() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/query")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::Json(json!({
                "query": "query GetUser($id: Int!) { user(id: $id) { name } }",
                "variables": {"id": 5, "_": []},
                "operationName": "GetUser",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data":{"user":{"name":"alice"}}}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let vars = variables();
        let out = transport
            .execute(&GraphQlRequest {
                query: "query GetUser($id: Int!) { user(id: $id) { name } }",
                variables: &vars,
                operation_name: Some("GetUser"),
            })
            .await
            .unwrap();

        assert_eq!(out, br#"{"user":{"name":"alice"}}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn execute_returns_error_on_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let vars = Variables::new();
        let err = transport
            .execute(&GraphQlRequest {
                query: "{ a }",
                variables: &vars,
                operation_name: None,
            })
            .await
            .unwrap_err();

        let err_msg = err.to_string();
        assert!(err_msg.contains("502"), "got: {err_msg}");
        assert!(err_msg.contains("bad gateway"), "got: {err_msg}");
    }

    #[tokio::test]
    async fn execute_returns_graphql_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_body(r#"{"data":null,"errors":[{"message":"not found"},{"message":"denied"}]}"#)
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let vars = Variables::new();
        let err = transport
            .execute(&GraphQlRequest {
                query: "{ a }",
                variables: &vars,
                operation_name: None,
            })
            .await
            .unwrap_err();

        match err {
            DispatchError::GraphQl { messages } => assert_eq!(messages, ["not found", "denied"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn execute_returns_null_without_data() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let vars = Variables::new();
        let out = transport
            .execute(&GraphQlRequest {
                query: "{ a }",
                variables: &vars,
                operation_name: None,
            })
            .await
            .unwrap();
        assert_eq!(out, b"null");
    }

    #[tokio::test]
    async fn execute_rejects_non_json_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/query")
            .with_status(200)
            .with_body("plain text response")
            .create_async()
            .await;

        let transport = HttpTransport::new(format!("{}/query", server.url()), None).unwrap();
        let vars = Variables::new();
        let err = transport
            .execute(&GraphQlRequest {
                query: "{ a }",
                variables: &vars,
                operation_name: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidResponse(_)));
    }
}
