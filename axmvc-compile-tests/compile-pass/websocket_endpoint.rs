use axmvc::prelude::*;

#[derive(Default)]
pub struct Echo;

#[routes(ws = "/echo/{channel}")]
impl Echo {
    #[ws_connect]
    fn connect(&self, channel: String, session: &WsSession) -> Result<(), HttpError> {
        session.send_text(format!("joined {channel}"))?;
        Ok(())
    }

    #[ws_message]
    async fn message(&self, text: String, ids: Vec<Option<i64>>) -> WsJsonResult<Vec<String>> {
        WsJsonResult::new(ids.iter().map(|id| format!("{text}:{id:?}")).collect())
    }

    #[ws_binary_message]
    fn binary(&self, ctx: &WsBinaryMessageContext) -> WsBinaryResult {
        WsBinaryResult::new(ctx.data().clone())
    }

    #[ws_error]
    fn error(&self, ctx: &WsErrorContext) {
        let _ = ctx.error();
    }

    #[ws_disconnect]
    fn disconnect(&self, ctx: &WsDisconnectContext) {
        let _ = (ctx.status_code(), ctx.reason());
    }
}

fn main() {
    let _router = MvcApp::new(()).register::<Echo>().build();
}
