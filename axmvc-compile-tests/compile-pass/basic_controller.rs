use axmvc::prelude::*;

#[derive(Default)]
pub struct BasicController;

#[routes(path = "/api")]
impl BasicController {
    #[get("/hello")]
    async fn hello(&self) -> String {
        "hello".to_string()
    }

    #[post("/echo")]
    async fn echo(&self, body: String) -> String {
        body
    }
}

fn main() {
    let _router = MvcApp::new(()).register::<BasicController>().build();
}
