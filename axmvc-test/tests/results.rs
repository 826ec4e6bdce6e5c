use std::future::Future;

use axmvc::http::HeaderValue;
use axmvc::prelude::*;
use axmvc_test::TestApp;
use serde::Serialize;

#[derive(Debug)]
struct QuotaExceeded(u32);

impl std::fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "quota of {} exceeded", self.0)
    }
}

map_error! {
    QuotaExceeded => Forbidden,
}

/// Answers 418 with a fixed body.
struct Teapot;

impl ActionResult for Teapot {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        let response = ctx.response_mut();
        response.set_status(StatusCode::IM_A_TEAPOT);
        response.set_body(HeaderValue::from_static("text/plain"), "short and stout");
        Ok(())
    }
}

/// Serializable, but executes itself as a download.
#[derive(Serialize)]
struct Download {
    name: &'static str,
}

impl ActionResult for Download {
    fn execute(self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        let response = ctx.response_mut();
        response.set_status(StatusCode::ACCEPTED);
        response.set_body(HeaderValue::from_static("application/octet-stream"), self.name);
        Ok(())
    }
}

#[derive(Serialize)]
struct Summary {
    total: u32,
    names: Vec<&'static str>,
}

#[derive(Default)]
struct ShapeController;

#[routes(path = "/shapes")]
impl ShapeController {
    #[post("/void")]
    fn void(&self) {}

    #[post("/async-void")]
    async fn async_void(&self) {}

    #[get("/value")]
    fn value(&self) -> Summary {
        Summary {
            total: 2,
            names: vec!["a", "b"],
        }
    }

    #[get("/async-value")]
    async fn async_value(&self, n: u32) -> u32 {
        n * 2
    }

    #[get("/future")]
    fn future(&self) -> impl Future<Output = String> {
        async { "later".to_string() }
    }

    #[get("/text")]
    fn text(&self) -> ContentResult {
        ContentResult::text("plain")
    }

    #[delete("/gone")]
    async fn gone(&self) -> StatusCodeResult {
        StatusCodeResult::no_content()
    }

    #[get("/redirect")]
    fn redirect(&self) -> impl ActionResult {
        RedirectResult::see_other("/shapes/value")
    }

    #[get("/teapot")]
    #[action]
    fn teapot(&self) -> Teapot {
        Teapot
    }

    #[get("/download")]
    fn download(&self) -> Download {
        Download { name: "a.bin" }
    }

    #[get("/async-download")]
    async fn async_download(&self) -> Result<Download, HttpError> {
        Ok(Download { name: "b.bin" })
    }

    #[get("/fallible/{n}")]
    fn fallible(&self, n: u32) -> Result<u32, QuotaExceeded> {
        if n > 10 {
            Err(QuotaExceeded(10))
        } else {
            Ok(n)
        }
    }

    #[get("/missing")]
    async fn missing(&self) -> Result<JsonResult<u32>, HttpError> {
        Err(HttpError::NotFound("no such thing".into()))
    }

    #[put("/status")]
    fn status(&self, ctx: &mut HttpContext) -> Result<(), HttpError> {
        ctx.response_mut().set_status(StatusCode::ACCEPTED);
        Ok(())
    }
}

fn app() -> TestApp {
    TestApp::from_app(MvcApp::new(()).register::<ShapeController>())
}

#[tokio::test]
async fn test_void_actions_render_empty_ok() {
    let resp = app().post("/shapes/void").send().await.assert_ok();
    assert!(resp.body.is_empty());
    let resp = app().post("/shapes/async-void").send().await.assert_ok();
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_values_are_serialized_as_json() {
    let resp = app()
        .get("/shapes/value")
        .send()
        .await
        .assert_ok()
        .assert_json_path("total", 2)
        .assert_json_path("names[1]", "b");
    assert_eq!(resp.header("content-type"), Some("application/json"));

    let resp = app()
        .get("/shapes/async-value")
        .query("n", "21")
        .send()
        .await
        .assert_ok();
    assert_eq!(resp.json::<u32>(), 42);
}

#[tokio::test]
async fn test_future_results_are_awaited() {
    let resp = app().get("/shapes/future").send().await.assert_ok();
    assert_eq!(resp.json::<String>(), "later");
}

#[tokio::test]
async fn test_action_results_execute_themselves() {
    let resp = app().get("/shapes/text").send().await.assert_ok();
    assert_eq!(resp.text(), "plain");
    assert_eq!(resp.header("content-type"), Some("text/plain; charset=utf-8"));

    app().delete("/shapes/gone").send().await.assert_no_content();

    let resp = app()
        .get("/shapes/redirect")
        .send()
        .await
        .assert_status(StatusCode::SEE_OTHER);
    assert_eq!(resp.header("location"), Some("/shapes/value"));
}

#[tokio::test]
async fn test_marked_custom_action() {
    let resp = app()
        .get("/shapes/teapot")
        .send()
        .await
        .assert_status(StatusCode::IM_A_TEAPOT);
    assert_eq!(resp.text(), "short and stout");
}

#[tokio::test]
async fn test_unmarked_custom_action_executes_itself() {
    let resp = app()
        .get("/shapes/download")
        .send()
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert_eq!(resp.text(), "a.bin");
    assert_eq!(resp.header("content-type"), Some("application/octet-stream"));

    let resp = app()
        .get("/shapes/async-download")
        .send()
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert_eq!(resp.text(), "b.bin");
}

#[tokio::test]
async fn test_errors_map_to_status() {
    let resp = app().get("/shapes/fallible/3").send().await.assert_ok();
    assert_eq!(resp.json::<u32>(), 3);

    app()
        .get("/shapes/fallible/11")
        .send()
        .await
        .assert_status(StatusCode::FORBIDDEN)
        .assert_json_path("error", "quota of 10 exceeded");

    app()
        .get("/shapes/missing")
        .send()
        .await
        .assert_not_found()
        .assert_json_path("error", "no such thing");
}

#[tokio::test]
async fn test_mutable_context_shapes_the_response() {
    let resp = app()
        .put("/shapes/status")
        .send()
        .await
        .assert_status(StatusCode::ACCEPTED);
    assert!(resp.body.is_empty());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    app().get("/shapes/nothing-here").send().await.assert_not_found();
}

#[tokio::test]
async fn test_wrong_method_is_rejected() {
    app()
        .get("/shapes/void")
        .send()
        .await
        .assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
