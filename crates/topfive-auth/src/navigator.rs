//! Redirect seam
//!
//! Successful login, logout, and registration redirect to the application
//! root. The view layer owns routing, so it supplies the implementation.

pub trait Navigator: Send + Sync {
    fn redirect_to_root(&self);
}

/// Navigator that only records the request in the diagnostic log. Default
/// while no view layer is attached.
#[derive(Debug, Default)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn redirect_to_root(&self) {
        tracing::debug!("Redirect to root requested with no navigator attached");
    }
}
