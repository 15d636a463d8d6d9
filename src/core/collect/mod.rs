//! Per-file collection: symbol tables and registration sites.
//!
//! Both collectors read a single parsed file and never look across files;
//! cross-file lookups are the job of [`crate::core::resolve`].

pub mod helpers;
pub mod registrations;
pub mod symbols;

pub use registrations::{Registration, RegistrationTarget, collect_registrations};
pub use symbols::{Declaration, DeclarationNode, FileSymbols};
