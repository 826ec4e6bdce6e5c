use axmvc::prelude::*;

#[derive(Clone)]
pub struct AppState {
    pub greeting: String,
}

pub struct Scope {
    greeting: String,
}

impl Container for AppState {
    type Injector = Scope;

    fn injector(&self) -> Scope {
        Scope {
            greeting: self.greeting.clone(),
        }
    }
}

impl Scope {
    fn greeter(&self) -> Greeter {
        Greeter {
            greeting: self.greeting.clone(),
        }
    }

    fn audit(&self) -> Audit {
        Audit
    }
}

pub struct Audit;

impl AfterAction<AppState> for Audit {
    async fn after(&self, ctx: &mut AfterContext<'_, AppState>) {
        let _ = (ctx.controller_name, ctx.action_name, ctx.has_error());
    }
}

pub struct Greeter {
    greeting: String,
}

#[routes(state = AppState, path = "/greet", inject = greeter)]
#[after(inject = audit)]
impl Greeter {
    #[get("/{name}")]
    fn greet(&self, name: String, #[from(header)] #[named("accept-language")] lang: Option<String>) -> String {
        format!("{} {name} ({})", self.greeting, lang.unwrap_or_default())
    }
}

fn main() {
    let state = AppState {
        greeting: "hi".into(),
    };
    let _router = MvcApp::new(state).register::<Greeter>().build();
}
