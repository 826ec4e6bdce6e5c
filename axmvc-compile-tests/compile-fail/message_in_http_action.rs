use axmvc::prelude::*;

struct Search;

#[routes(path = "/search")]
impl Search {
    #[get]
    fn find(&self, #[from(message)] text: String) -> String {
        text
    }
}

fn main() {
    let _ = Search;
}
