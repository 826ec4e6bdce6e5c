use axmvc::prelude::*;

struct Users;

#[routes(path = "/users")]
impl Users {
    #[get("/all")]
    fn show(&self, #[from(path)] id: u32) -> u32 {
        id
    }
}

fn main() {
    let _ = Users;
}
