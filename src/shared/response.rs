//! Standardized response bodies.
//!
//! Every endpoint answers with the `{status, data, links, meta}`
//! envelope; `links` and `meta` appear only when set. The streamed
//! variant emits the same envelope incrementally for result sets too
//! large to buffer before the first byte goes out.

use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::{stream, Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct Envelope<T> {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub links: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object)]
    pub meta: Option<Value>,
}

impl<T> Envelope<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        Self {
            status: status.as_u16(),
            data: Some(data),
            links: None,
            meta: None,
        }
    }

    #[allow(dead_code)]
    pub fn with_links(mut self, links: Value) -> Self {
        self.links = Some(links);
        self
    }

    #[allow(dead_code)]
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

enum StreamState<S> {
    Prefix(String, S),
    First(S),
    Rest(S),
    Done,
}

/// Envelope emitted as a chunk sequence: the header fragment first,
/// then each `data` array chunk exactly in producer order, then the
/// closing brace. An empty source yields `[]}` so the document stays
/// well-formed. The source is consumed once.
pub fn envelope_stream<S>(
    status: StatusCode,
    chunks: S,
    links: Option<Value>,
    meta: Option<Value>,
) -> impl Stream<Item = String>
where
    S: Stream<Item = String> + Send + Unpin + 'static,
{
    let mut prefix = format!("{{\"status\":{}", status.as_u16());
    if let Some(links) = links {
        prefix.push_str(&format!(", \"links\": {}", links));
    }
    if let Some(meta) = meta {
        prefix.push_str(&format!(", \"meta\": {}", meta));
    }
    prefix.push_str(", \"data\": ");

    stream::unfold(StreamState::Prefix(prefix, chunks), |state| async move {
        match state {
            StreamState::Prefix(prefix, chunks) => Some((prefix, StreamState::First(chunks))),
            StreamState::First(mut chunks) => match chunks.next().await {
                Some(chunk) => Some((chunk, StreamState::Rest(chunks))),
                None => Some(("[]}".to_string(), StreamState::Done)),
            },
            StreamState::Rest(mut chunks) => match chunks.next().await {
                Some(chunk) => Some((chunk, StreamState::Rest(chunks))),
                None => Some(("}".to_string(), StreamState::Done)),
            },
            StreamState::Done => None,
        }
    })
}

/// Streamed counterpart of [`Envelope`].
#[allow(dead_code)]
pub fn streamed_envelope<S>(
    status: StatusCode,
    chunks: S,
    links: Option<Value>,
    meta: Option<Value>,
) -> Response
where
    S: Stream<Item = String> + Send + Unpin + 'static,
{
    let body = Body::from_stream(
        envelope_stream(status, chunks, links, meta)
            .map(|chunk| Ok::<_, std::convert::Infallible>(Bytes::from(chunk))),
    );

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn collect<S: Stream<Item = String>>(stream: S) -> String {
        stream.collect::<Vec<_>>().await.concat()
    }

    #[test]
    fn envelope_omits_absent_links_and_meta() {
        let envelope = Envelope::new(StatusCode::OK, json!({"links": []}));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": 200, "data": {"links": []}})
        );
    }

    #[test]
    fn envelope_includes_links_and_meta_when_set() {
        let envelope = Envelope::new(StatusCode::OK, json!([]))
            .with_links(json!({"next": "/api/v1/links?offset=100"}))
            .with_meta(json!({"total": 0}));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "status": 200,
                "data": [],
                "links": {"next": "/api/v1/links?offset=100"},
                "meta": {"total": 0}
            })
        );
    }

    #[test]
    fn empty_stream_produces_empty_array_document() {
        let body = tokio_test::block_on(collect(envelope_stream(
            StatusCode::OK,
            stream::iter(Vec::<String>::new()),
            None,
            None,
        )));
        assert_eq!(body, r#"{"status":200, "data": []}"#);
    }

    #[test]
    fn chunks_are_forwarded_in_order() {
        let chunks = vec![
            "[".to_string(),
            r#"{"id":1}"#.to_string(),
            ",".to_string(),
            r#"{"id":2}"#.to_string(),
            "]".to_string(),
        ];
        let body = tokio_test::block_on(collect(envelope_stream(
            StatusCode::OK,
            stream::iter(chunks),
            None,
            None,
        )));
        assert_eq!(body, r#"{"status":200, "data": [{"id":1},{"id":2}]}"#);
        // the assembled document is valid JSON
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["data"][1]["id"], 2);
    }

    #[test]
    fn stream_prefix_carries_links_and_meta() {
        let body = tokio_test::block_on(collect(envelope_stream(
            StatusCode::OK,
            stream::iter(Vec::<String>::new()),
            Some(json!({"self": "/api/v1/links"})),
            Some(json!({"total": 0})),
        )));
        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["links"]["self"], "/api/v1/links");
        assert_eq!(value["meta"]["total"], 0);
        assert_eq!(value["data"], json!([]));
    }
}
