//! Generic request helpers shared by every resource service.
//!
//! # Design
//! Each helper performs exactly one round trip through the [`Transport`] and
//! decodes the response envelope. On success it returns the decoded value
//! together with the raw response. There are no retries. The first failure
//! is returned as is.
//!
//! Collection-level helpers take a path. Single-record helpers take the
//! endpoint and the record id separately, so the id always lands in the URL
//! as one segment (see [`Transport::record_url`]).

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpResponse};
use crate::transport::Transport;
use crate::types::{CreateResult, DataEnvelope, ModifyResult, QueryParams};

/// A decoded value paired with the response it came from.
pub type ApiResult<T> = Result<(T, HttpResponse), ApiError>;

/// GET `path` with `params` as the query string and decode `{"data": [...]}`.
///
/// A filter that matches nothing yields an empty `Vec`, not an error.
pub fn do_list<P, T>(transport: &Transport, path: &str, params: Option<&P>) -> ApiResult<Vec<T>>
where
    P: QueryParams + ?Sized,
    T: DeserializeOwned,
{
    let url = match params {
        Some(params) => transport.url_with_query(path, params)?,
        None => transport.url(path)?,
    };
    let request = transport.request(HttpMethod::Get, url);
    let response = transport.send(&request)?;
    let envelope: DataEnvelope<Vec<T>> = decode(&response)?;
    Ok((envelope.data, response))
}

/// GET `endpoint/{id}` and decode `{"data": {...}}`.
pub fn do_get<T>(transport: &Transport, endpoint: &str, id: &str) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    let request = transport.request(HttpMethod::Get, transport.record_url(endpoint, id)?);
    let response = transport.send(&request)?;
    let envelope: DataEnvelope<T> = decode(&response)?;
    Ok((envelope.data, response))
}

/// POST `input` as JSON to `path`.
pub fn do_create<I>(transport: &Transport, path: &str, input: &I) -> ApiResult<CreateResult>
where
    I: Serialize + ?Sized,
{
    let request = transport.json_request(HttpMethod::Post, transport.url(path)?, input)?;
    let response = transport.send(&request)?;
    let result = decode(&response)?;
    Ok((result, response))
}

/// PATCH `input` as JSON to `endpoint/{id}`. Fields the input leaves out
/// stay untouched.
pub fn do_update<I>(transport: &Transport, endpoint: &str, id: &str, input: &I) -> ApiResult<ModifyResult>
where
    I: Serialize + ?Sized,
{
    let url = transport.record_url(endpoint, id)?;
    let request = transport.json_request(HttpMethod::Patch, url, input)?;
    let response = transport.send(&request)?;
    let result = decode(&response)?;
    Ok((result, response))
}

/// DELETE `endpoint/{id}`.
pub fn do_delete(transport: &Transport, endpoint: &str, id: &str) -> ApiResult<ModifyResult> {
    let request = transport.request(HttpMethod::Delete, transport.record_url(endpoint, id)?);
    let response = transport.send(&request)?;
    let result = decode(&response)?;
    Ok((result, response))
}

/// Turn `ApiError::NotFound` into `Ok(None)` and drop the raw response.
pub fn optional<T>(result: ApiResult<T>) -> Result<Option<T>, ApiError> {
    match result {
        Ok((value, _)) => Ok(Some(value)),
        Err(ApiError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Map non-success status codes to the matching `ApiError` variant.
pub(crate) fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    warn!(status = response.status, "unsuccessful response");
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    check_status(response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;
    use tracing_test::traced_test;
    use url::form_urlencoded;

    use super::*;
    use crate::http::fake::FakeExecutor;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    struct Row {
        id: String,
    }

    #[derive(Serialize)]
    struct Patch {
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    }

    struct Kind(Option<String>);

    impl QueryParams for Kind {
        fn populate_qp(&self, qp: &mut form_urlencoded::Serializer<'_, String>) {
            crate::types::append_filter(qp, "kind", &self.0);
        }
    }

    fn setup(executor: FakeExecutor) -> (Transport, Arc<FakeExecutor>) {
        let executor = Arc::new(executor);
        let headers = vec![("accept".to_string(), "application/json".to_string())];
        let transport = Transport::new("http://localhost:3000", headers, executor.clone()).unwrap();
        (transport, executor)
    }

    #[test]
    fn list_sends_query_and_decodes_rows() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"data":[{"id":"a"},{"id":"b"}]}"#));
        let (rows, raw): (Vec<Row>, _) = do_list(&t, "rows", Some(&Kind(Some("user".into())))).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(raw.status, 200);

        let sent = exec.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].method, HttpMethod::Get);
        assert_eq!(sent[0].url, "http://localhost:3000/rows?kind=user");
        assert_eq!(
            sent[0].headers,
            vec![("accept".to_string(), "application/json".to_string())]
        );
        assert!(sent[0].body.is_none());
    }

    #[test]
    fn list_without_params_has_no_query() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"data":[]}"#));
        let (rows, _): (Vec<Row>, _) = do_list::<(), _>(&t, "rows", None).unwrap();
        assert!(rows.is_empty());
        assert_eq!(exec.requests()[0].url, "http://localhost:3000/rows");
    }

    #[test]
    fn list_skips_unset_filters() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"data":[]}"#));
        let _: (Vec<Row>, _) = do_list(&t, "rows", Some(&Kind(None))).unwrap();
        assert_eq!(exec.requests()[0].url, "http://localhost:3000/rows");
    }

    #[test]
    fn list_with_null_data_is_empty() {
        let (t, _) = setup(FakeExecutor::default().respond(200, r#"{"data":null}"#));
        let (rows, _): (Vec<Row>, _) = do_list::<(), _>(&t, "rows", None).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn get_decodes_single_record() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"data":{"id":"a"}}"#));
        let (row, _): (Row, _) = do_get(&t, "rows", "a").unwrap();
        assert_eq!(row, Row { id: "a".into() });
        assert_eq!(exec.requests()[0].url, "http://localhost:3000/rows/a");
    }

    #[test]
    fn get_not_found() {
        let (t, _) = setup(FakeExecutor::default().respond(404, r#"{"message":"not found"}"#));
        let err = do_get::<Row>(&t, "rows", "a").unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn get_bad_json_is_a_decode_error() {
        let (t, _) = setup(FakeExecutor::default().respond(200, "not json"));
        let err = do_get::<Row>(&t, "rows", "a").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn create_posts_json() {
        let (t, exec) = setup(FakeExecutor::default().respond(201, r#"{"data":"new-id"}"#));
        let (created, raw) = do_create(&t, "rows", &serde_json::json!({"id": "new-id"})).unwrap();
        assert_eq!(created.data, "new-id");
        assert_eq!(raw.status, 201);

        let sent = exec.requests();
        let sent = &sent[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert!(sent
            .headers
            .contains(&("content-type".to_string(), "application/json".to_string())));
        assert_eq!(sent.body.as_deref(), Some(r#"{"id":"new-id"}"#));
    }

    #[test]
    fn create_server_error_keeps_status_and_body() {
        let (t, _) = setup(FakeExecutor::default().respond(500, "internal error"));
        let err = do_create(&t, "rows", &serde_json::json!({})).unwrap_err();
        match err {
            ApiError::HttpError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn update_patches_only_set_fields() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"replaced":1}"#));
        let (result, _) = do_update(&t, "rows", "a", &Patch { name: Some("x".into()) }).unwrap();
        assert_eq!(result.replaced, 1);

        let sent = exec.requests();
        let sent = &sent[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.body.as_deref(), Some(r#"{"name":"x"}"#));
    }

    #[test]
    fn empty_update_sends_empty_object() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"unchanged":1}"#));
        let (result, _) = do_update(&t, "rows", "a", &Patch { name: None }).unwrap();
        assert_eq!(result.unchanged, 1);
        assert_eq!(exec.requests()[0].body.as_deref(), Some("{}"));
    }

    #[test]
    fn delete_has_no_body() {
        let (t, exec) = setup(FakeExecutor::default().respond(200, r#"{"deleted":1}"#));
        let (result, _) = do_delete(&t, "rows", "a").unwrap();
        assert_eq!(result.deleted, 1);

        let sent = exec.requests();
        let sent = &sent[0];
        assert_eq!(sent.method, HttpMethod::Delete);
        assert!(sent.body.is_none());
    }

    #[test]
    fn transport_failure_is_not_retried() {
        let (t, exec) = setup(
            FakeExecutor::default()
                .fail("connection refused")
                .respond(200, r#"{"deleted":1}"#),
        );
        let err = do_delete(&t, "rows", "a").unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(exec.requests().len(), 1);
    }

    #[test]
    fn any_2xx_is_accepted() {
        let (t, _) = setup(FakeExecutor::default().respond(202, r#"{"deleted":2}"#));
        let (result, _) = do_delete(&t, "rows", "a").unwrap();
        assert_eq!(result.deleted, 2);
    }

    #[test]
    fn record_helpers_refuse_collection_ids() {
        let (t, exec) = setup(FakeExecutor::default());
        for id in ["", ".", ".."] {
            assert!(matches!(do_get::<Row>(&t, "rows", id), Err(ApiError::InvalidId(_))));
            assert!(matches!(
                do_update(&t, "rows", id, &Patch { name: None }),
                Err(ApiError::InvalidId(_))
            ));
            assert!(matches!(do_delete(&t, "rows", id), Err(ApiError::InvalidId(_))));
        }
        assert!(exec.requests().is_empty(), "nothing may reach the executor");
    }

    #[test]
    #[traced_test]
    fn requests_are_logged() {
        let (t, _) = setup(FakeExecutor::default().respond(404, "{}"));
        let _ = do_get::<Row>(&t, "rows", "missing");
        assert!(logs_contain("sending request"));
        assert!(logs_contain("http://localhost:3000/rows/missing"));
        assert!(logs_contain("unsuccessful response"));
    }
}
