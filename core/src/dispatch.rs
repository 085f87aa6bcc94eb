//! Request dispatch and response interpretation.
//!
//! # Design
//! Every remote operation resolves through [`interpret`], so the status-only
//! DELETE rule and the embedded `error` check exist once. The outcome is
//! wrapped in a [`Call`], which offers both completion channels over the
//! same future:
//!
//! - `call.await` yields the `Result` directly;
//! - `call.on_complete(callback)` spawns the future on the current tokio
//!   runtime and hands the `Result` to `callback` exactly once. Without a
//!   runtime the callback receives `ApiError::Runtime` right away.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use serde_json::Value;
use tracing::{debug, trace};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'static>>;

/// A pending remote operation.
///
/// The request was composed when the `Call` was created; nothing is sent
/// until the call is awaited or handed to [`Call::on_complete`].
#[must_use = "a Call does nothing unless awaited or given a callback"]
pub struct Call<T> {
    future: BoxFuture<T>,
}

impl<T: Send + 'static> Call<T> {
    pub(crate) fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        Self {
            future: Box::pin(future),
        }
    }

    /// A call that fails without touching the transport.
    pub(crate) fn failed(err: ApiError) -> Self {
        Self::new(async move { Err(err) })
    }

    pub(crate) fn map<U, F>(self, f: F) -> Call<U>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Call::new(async move { self.future.await.map(f) })
    }

    /// Runs the call in the background and reports the outcome to
    /// `callback`.
    ///
    /// The call runs on the current tokio runtime. Outside one, `callback`
    /// is invoked immediately with `ApiError::Runtime` and nothing is sent.
    pub fn on_complete<F>(self, callback: F)
    where
        F: FnOnce(Result<T, ApiError>) + Send + 'static,
    {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    callback(self.future.await);
                });
            }
            Err(err) => callback(Err(ApiError::Runtime(err.to_string()))),
        }
    }
}

impl<T> Future for Call<T> {
    type Output = Result<T, ApiError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.as_mut().poll(cx)
    }
}

impl<T> fmt::Debug for Call<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call").finish_non_exhaustive()
    }
}

/// Sends `request` and interprets the response.
pub(crate) async fn dispatch(
    transport: Arc<dyn Transport>,
    request: HttpRequest,
) -> Result<Option<Value>, ApiError> {
    debug!(method = %request.method, url = %request.url, "dispatching request");
    let method = request.method;
    let response = transport.execute(request).await?;
    trace!(status = response.status, "response received");
    interpret(method, response)
}

/// Turns a raw response into an outcome.
///
/// DELETE calls only look at the status: 200 is success without payload,
/// anything else is `ApiError::Status`. All other calls decode the body and
/// fail with `ApiError::Application` when it carries a truthy `error` field.
pub fn interpret(method: HttpMethod, response: HttpResponse) -> Result<Option<Value>, ApiError> {
    if method == HttpMethod::Delete {
        return match response.status {
            200 => Ok(None),
            status => Err(ApiError::Status { status }),
        };
    }

    let body: Value =
        serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;
    if carries_error(&body) {
        return Err(ApiError::Application(body));
    }
    Ok(Some(body))
}

/// Whether `body` signals an application error.
///
/// Only objects can carry one. The `error` member counts when it is truthy:
/// absent, `null`, `false`, `""` and `0` are success; any other string,
/// number, `true`, array or object is an error.
fn carries_error(body: &Value) -> bool {
    match body.get("error") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn delete_200_is_empty_success() {
        let outcome = interpret(HttpMethod::Delete, response(200, "")).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn delete_ignores_body() {
        let outcome = interpret(HttpMethod::Delete, response(200, r#"{"error":"ignored"}"#)).unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn delete_other_status_carries_code() {
        for status in [204, 404, 500] {
            let err = interpret(HttpMethod::Delete, response(status, "")).unwrap_err();
            assert!(matches!(err, ApiError::Status { status: s } if s == status));
        }
    }

    #[test]
    fn json_body_is_returned() {
        let outcome = interpret(HttpMethod::Get, response(200, r#"{"id":1,"note":"x"}"#)).unwrap();
        assert_eq!(outcome, Some(json!({"id": 1, "note": "x"})));
    }

    #[test]
    fn arrays_are_never_application_errors() {
        let outcome = interpret(HttpMethod::Get, response(200, r#"[{"error":"nested"}]"#)).unwrap();
        assert_eq!(outcome, Some(json!([{"error": "nested"}])));
    }

    #[test]
    fn error_field_becomes_application_error() {
        let err = interpret(HttpMethod::Post, response(200, r#"{"error":"Timer already running","status":422}"#))
            .unwrap_err();
        match err {
            ApiError::Application(body) => {
                assert_eq!(body, json!({"error": "Timer already running", "status": 422}));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn falsy_error_field_is_success() {
        for body in [
            r#"{"error":null}"#,
            r#"{"error":false}"#,
            r#"{"error":""}"#,
            r#"{"error":0}"#,
            r#"{"error":0.0}"#,
        ] {
            assert!(interpret(HttpMethod::Get, response(200, body)).is_ok(), "{body}");
        }
    }

    #[test]
    fn truthy_error_field_is_application_error() {
        for body in [
            r#"{"error":true}"#,
            r#"{"error":1}"#,
            r#"{"error":{}}"#,
            r#"{"error":[]}"#,
            r#"{"error":"x"}"#,
        ] {
            let err = interpret(HttpMethod::Get, response(200, body)).unwrap_err();
            assert!(matches!(err, ApiError::Application(_)), "{body}");
        }
    }

    #[test]
    fn non_200_json_is_judged_by_body() {
        let outcome = interpret(HttpMethod::Get, response(201, r#"{"id":3}"#)).unwrap();
        assert_eq!(outcome, Some(json!({"id": 3})));
        let err = interpret(HttpMethod::Get, response(401, r#"{"error":"unauthorized"}"#)).unwrap_err();
        assert!(matches!(err, ApiError::Application(_)));
    }

    #[test]
    fn malformed_json_is_decode_error() {
        let err = interpret(HttpMethod::Get, response(200, "<html>")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        let err = interpret(HttpMethod::Put, response(200, "")).unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn await_and_callback_agree() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        Call::new(async { Ok::<_, ApiError>(7) }).on_complete(move |r| {
            let _ = tx.send(r);
        });
        assert_eq!(rx.await.unwrap().unwrap(), 7);
        assert_eq!(Call::new(async { Ok::<_, ApiError>(7) }).await.unwrap(), 7);
    }

    #[tokio::test]
    async fn failed_call_reports_through_callback() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        Call::<()>::failed(ApiError::Status { status: 404 }).on_complete(move |r| {
            let _ = tx.send(r);
        });
        let err = rx.await.unwrap().unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn callback_without_runtime_gets_runtime_error() {
        let (tx, rx) = std::sync::mpsc::channel();
        Call::new(async { Ok::<_, ApiError>(7) }).on_complete(move |r| {
            let _ = tx.send(r);
        });
        let err = rx.try_recv().unwrap().unwrap_err();
        assert!(matches!(err, ApiError::Runtime(_)));
    }

    #[tokio::test]
    async fn map_transforms_success_only() {
        let doubled = Call::new(async { Ok::<_, ApiError>(21) }).map(|n| n * 2).await;
        assert_eq!(doubled.unwrap(), 42);
        let err = Call::<i32>::failed(ApiError::Decode("eof".into())).map(|n| n * 2).await;
        assert!(matches!(err, Err(ApiError::Decode(_))));
    }
}
