//! Client-side auth-state resolution: outcome classification, session persistence, the
//! login hand-off, and the controller reconciling them into one observable state.

pub mod controller;
pub mod login;
pub mod outcome;
pub mod session;

pub use controller::*;
pub use login::*;
pub use outcome::*;
pub use session::*;
