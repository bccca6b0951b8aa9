pub mod binder;
pub mod factory;
pub mod lifecycle;
pub mod resolver;
pub mod store;

pub use binder::TokenBinder;
pub use factory::TokenFactory;
pub use lifecycle::TokenLifecycle;
pub use resolver::TokenResolver;
pub use store::TokenStore;
