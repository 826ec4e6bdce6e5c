use axmvc::http::Router;
use axmvc::Source;
use axmvc_test::TestApp;

#[test]
#[should_panic(expected = "path values cannot be attached")]
fn test_path_values_belong_in_the_uri() {
    let app = TestApp::new(Router::new());
    let _ = app.get("/items").with(Source::Path, "id", "1");
}

#[tokio::test]
async fn test_unrouted_request_is_not_found() {
    let app = TestApp::new(Router::new());
    app.get("/items?page=1")
        .query("size", "10")
        .header("x-tenant", "acme")
        .cookie("session", "abc")
        .send()
        .await
        .assert_not_found();
}
