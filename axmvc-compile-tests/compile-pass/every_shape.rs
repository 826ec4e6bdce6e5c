use std::future::Future;

use axmvc::prelude::*;

#[derive(serde::Serialize)]
pub struct Item {
    id: u64,
}

#[derive(Default)]
pub struct Shapes;

#[routes(path = "/shapes")]
impl Shapes {
    #[post("/a")]
    fn sync_void(&self) {}

    #[post("/b")]
    async fn async_void(&self) -> Result<(), HttpError> {
        Ok(())
    }

    #[get("/c")]
    fn sync_value(&self) -> Item {
        Item { id: 1 }
    }

    #[get("/d")]
    async fn async_value(&self) -> Result<Vec<Item>, HttpError> {
        Ok(vec![])
    }

    #[get("/e")]
    fn sync_action(&self) -> ContentResult {
        ContentResult::html("<p>hi</p>")
    }

    #[get("/f")]
    async fn async_action(&self) -> impl ActionResult {
        StatusCodeResult::accepted()
    }

    #[get("/g")]
    fn future_value(&self) -> impl Future<Output = Result<u32, HttpError>> {
        async { Ok(1) }
    }

    #[get("/h")]
    #[head("/h")]
    fn many_verbs(&self, ctx: &mut HttpContext) -> JsonResult<&'static str> {
        let _ = ctx.request().method();
        JsonResult::new("ok")
    }
}

fn main() {
    let _ = <Shapes as Controller<()>>::route_table();
}
