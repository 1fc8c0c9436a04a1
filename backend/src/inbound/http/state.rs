//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CartCommand, CartQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub cart: Arc<dyn CartCommand>,
    pub cart_query: Arc<dyn CartQuery>,
}

impl HttpState {
    /// Bundle the cart ports.
    pub fn new(cart: Arc<dyn CartCommand>, cart_query: Arc<dyn CartQuery>) -> Self {
        Self { cart, cart_query }
    }

    /// Use one implementation for both cart ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use storefront::domain::CartService;
    /// use storefront::inbound::http::state::HttpState;
    /// use storefront::outbound::memory::{InMemoryCartRepository, InMemoryCatalogue};
    ///
    /// let service = CartService::new(
    ///     Arc::new(InMemoryCartRepository::default()),
    ///     Arc::new(InMemoryCatalogue::default()),
    /// );
    /// let _state = HttpState::from_service(Arc::new(service));
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: CartCommand + CartQuery + 'static,
    {
        Self {
            cart: service.clone(),
            cart_query: service,
        }
    }
}
