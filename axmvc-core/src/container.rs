use std::sync::Arc;

use crate::config::MvcConfig;
use crate::json::{JsonCodec, SerdeJsonCodec};

/// Application state seen by generated dispatch code.
///
/// The state doubles as the dependency-injection container: controllers
/// declared with `#[routes(inject = accessor)]` are obtained by calling
/// `accessor()` on the per-invocation [`Injector`](Container::Injector),
/// and so are interceptors declared with `inject = accessor`. Controllers
/// without an accessor are built with `Default::default()` and never touch
/// the injector.
///
/// ```ignore
/// #[derive(Clone)]
/// struct Services { users: UserRepository }
///
/// struct Scope { users: UserRepository }
///
/// impl Scope {
///     fn user_controller(&self) -> UserController {
///         UserController::new(self.users.clone())
///     }
/// }
///
/// impl Container for Services {
///     type Injector = Scope;
///     fn injector(&self) -> Scope {
///         Scope { users: self.users.clone() }
///     }
/// }
/// ```
pub trait Container: Clone + Send + Sync + 'static {
    type Injector: Send;

    /// Open a fresh injection scope for one dispatch.
    fn injector(&self) -> Self::Injector;

    fn config(&self) -> &MvcConfig {
        MvcConfig::defaults()
    }

    /// Codec for request bodies, message payloads and value results.
    fn json_codec(&self) -> Arc<dyn JsonCodec> {
        Arc::new(SerdeJsonCodec::from_config(self.config()))
    }
}

/// Stateless applications.
impl Container for () {
    type Injector = ();

    fn injector(&self) {}
}
