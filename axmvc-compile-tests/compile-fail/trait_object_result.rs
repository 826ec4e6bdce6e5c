use axmvc::prelude::*;

struct Reports;

#[routes(path = "/reports")]
impl Reports {
    #[get]
    fn latest(&self) -> Box<dyn ActionResult> {
        todo!()
    }
}

fn main() {
    let _ = Reports;
}
