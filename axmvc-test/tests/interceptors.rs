use std::sync::{Arc, Mutex};

use axmvc::http::HeaderValue;
use axmvc::prelude::*;
use axmvc_test::TestApp;

/// Shared log the interceptors and actions append to.
#[derive(Clone, Default)]
struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    fn push(&self, entry: impl Into<String>) {
        self.entries.lock().unwrap().push(entry.into());
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.entries.lock().unwrap())
    }
}

impl Container for Journal {
    type Injector = Journal;

    fn injector(&self) -> Journal {
        self.clone()
    }
}

impl Journal {
    fn audited(&self) -> AuditedController {
        AuditedController {
            journal: self.clone(),
        }
    }
}

struct Record(&'static str);

impl BeforeAction<Journal> for Record {
    async fn before(&self, ctx: &mut BeforeContext<'_, Journal>) -> Result<(), HttpError> {
        ctx.state.push(format!("before:{}:{}", self.0, ctx.action_name));
        Ok(())
    }
}

/// Rejects requests without an `x-key` header.
struct RequireKey;

impl BeforeAction<Journal> for RequireKey {
    async fn before(&self, ctx: &mut BeforeContext<'_, Journal>) -> Result<(), HttpError> {
        match ctx.http.request().header("x-key") {
            Some(_) => {
                ctx.state.push("before:key");
                Ok(())
            }
            None => Err(HttpError::Unauthorized("missing key".into())),
        }
    }
}

/// Sets a response header the action's result keeps.
struct Stamp;

impl<S: Send + Sync> BeforeAction<S> for Stamp {
    async fn before(&self, ctx: &mut BeforeContext<'_, S>) -> Result<(), HttpError> {
        ctx.http
            .response_mut()
            .headers_mut()
            .insert("x-stamp", HeaderValue::from_static("stamped"));
        Ok(())
    }
}

struct Audit(&'static str);

impl AfterAction<Journal> for Audit {
    async fn after(&self, ctx: &mut AfterContext<'_, Journal>) {
        let outcome = match ctx.error() {
            Some(error) => format!("err:{}", error.status().as_u16()),
            None => "ok".to_string(),
        };
        ctx.state.push(format!("after:{}:{outcome}", self.0));
    }
}

/// Turns any captured error into a 200 with a fallback body.
struct Recover;

impl AfterAction<Journal> for Recover {
    async fn after(&self, ctx: &mut AfterContext<'_, Journal>) {
        if ctx.clear_error().is_some() {
            let response = ctx.http.response_mut();
            response.set_status(StatusCode::OK);
            response.set_body(HeaderValue::from_static("text/plain"), "recovered");
        }
    }
}

/// Replaces any captured error with a 503.
struct Unavailable;

impl AfterAction<Journal> for Unavailable {
    async fn after(&self, ctx: &mut AfterContext<'_, Journal>) {
        if ctx.has_error() {
            ctx.set_error(HttpError::Custom {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: serde_json::json!({ "retry": true }),
            });
        }
    }
}

struct AuditedController {
    journal: Journal,
}

#[routes(state = Journal, path = "/audited", inject = audited)]
#[before(Record("class"))]
#[after(Audit("class"))]
impl AuditedController {
    #[get("/plain")]
    fn plain(&self) -> &'static str {
        self.journal.push("action:plain");
        "done"
    }

    #[get("/ordered")]
    #[before(Record("first"))]
    #[before(Record("second"))]
    #[after(Audit("method"))]
    fn ordered(&self) -> &'static str {
        self.journal.push("action:ordered");
        "done"
    }

    #[get("/guarded")]
    #[before(RequireKey)]
    fn guarded(&self) -> &'static str {
        self.journal.push("action:guarded");
        "done"
    }

    #[get("/failing")]
    fn failing(&self) -> Result<&'static str, HttpError> {
        self.journal.push("action:failing");
        Err(HttpError::BadRequest("nope".into()))
    }

    #[get("/binding")]
    fn binding(&self, count: u32) -> u32 {
        self.journal.push("action:binding");
        count
    }

    #[get("/recovered")]
    #[after(Recover)]
    fn recovered(&self) -> Result<u32, HttpError> {
        Err(HttpError::Internal("boom".into()))
    }

    #[get("/replaced")]
    #[after(Unavailable)]
    fn replaced(&self) -> Result<u32, HttpError> {
        Err(HttpError::NotFound("missing".into()))
    }

    #[get("/stamped")]
    #[before(Stamp)]
    fn stamped(&self) -> StatusCodeResult {
        StatusCodeResult::accepted()
    }
}

fn app(journal: &Journal) -> TestApp {
    TestApp::from_app(MvcApp::new(journal.clone()).register::<AuditedController>())
}

#[tokio::test]
async fn test_interceptors_wrap_the_action() {
    let journal = Journal::default();
    app(&journal).get("/audited/plain").send().await.assert_ok();
    assert_eq!(
        journal.take(),
        vec!["before:class:plain", "action:plain", "after:class:ok"]
    );
}

#[tokio::test]
async fn test_class_interceptors_run_before_method_ones() {
    let journal = Journal::default();
    app(&journal).get("/audited/ordered").send().await.assert_ok();
    assert_eq!(
        journal.take(),
        vec![
            "before:class:ordered",
            "before:first:ordered",
            "before:second:ordered",
            "action:ordered",
            "after:class:ok",
            "after:method:ok",
        ]
    );
}

#[tokio::test]
async fn test_failed_before_halts_dispatch() {
    let journal = Journal::default();
    app(&journal)
        .get("/audited/guarded")
        .send()
        .await
        .assert_status(StatusCode::UNAUTHORIZED)
        .assert_json_path("error", "missing key");
    assert_eq!(journal.take(), vec!["before:class:guarded"]);

    app(&journal)
        .get("/audited/guarded")
        .header("x-key", "k")
        .send()
        .await
        .assert_ok();
    assert_eq!(
        journal.take(),
        vec!["before:class:guarded", "before:key", "action:guarded", "after:class:ok"]
    );
}

#[tokio::test]
async fn test_after_sees_action_errors() {
    let journal = Journal::default();
    app(&journal)
        .get("/audited/failing")
        .send()
        .await
        .assert_bad_request()
        .assert_json_path("error", "nope");
    assert_eq!(
        journal.take(),
        vec!["before:class:failing", "action:failing", "after:class:err:400"]
    );
}

#[tokio::test]
async fn test_after_sees_binding_errors() {
    let journal = Journal::default();
    app(&journal).get("/audited/binding").send().await.assert_bad_request();
    assert_eq!(
        journal.take(),
        vec!["before:class:binding", "after:class:err:400"]
    );
}

#[tokio::test]
async fn test_after_can_clear_the_error() {
    let journal = Journal::default();
    let resp = app(&journal).get("/audited/recovered").send().await.assert_ok();
    assert_eq!(resp.text(), "recovered");
    // `Audit("class")` runs first and still sees the error.
    assert_eq!(
        journal.take(),
        vec!["before:class:recovered", "after:class:err:500"]
    );
}

#[tokio::test]
async fn test_after_can_replace_the_error() {
    let journal = Journal::default();
    app(&journal)
        .get("/audited/replaced")
        .send()
        .await
        .assert_status(StatusCode::SERVICE_UNAVAILABLE)
        .assert_json_path("retry", true);
}

#[tokio::test]
async fn test_before_can_shape_the_response() {
    let journal = Journal::default();
    let resp = app(&journal)
        .get("/audited/stamped")
        .send()
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert_eq!(resp.header("x-stamp"), Some("stamped"));
}
