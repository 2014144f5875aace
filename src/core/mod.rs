pub mod client;
pub mod scope;
pub mod tasks;

pub use crate::domain::model::Scope;
pub use crate::domain::ports::{LookupSource, ManagedResource};
pub use crate::utils::error::Result;
pub use client::{EdgeCloud, ServiceClient};
pub use scope::ScopeRef;
