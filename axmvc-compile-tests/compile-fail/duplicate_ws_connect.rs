use axmvc::prelude::*;

struct Lobby;

#[routes(ws = "/lobby")]
impl Lobby {
    #[ws_connect]
    fn joined(&self) {}

    #[ws_connect]
    fn joined_again(&self) {}
}

fn main() {
    let _ = Lobby;
}
