//! Provider-facing endpoint descriptors.
//!
//! `descriptor` exposes validated endpoint metadata (`ProviderDescriptor`) covering the
//! authorization page, the token endpoint, and the user-info/emails API. Core logic only
//! ever sees an explicitly constructed descriptor; nothing reads ambient process state.

pub mod descriptor;

pub use descriptor::*;
