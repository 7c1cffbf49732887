#![deny(missing_docs)]

//! The logical type system for colvec.
//!
//! [`DType`] describes the type of a single vector without its children, [`Field`] attaches a
//! name, a [`Nullability`] and child fields to it, and [`MinorType`] is the flat tag that union
//! vectors store per row to say which variant a row holds.

pub use decimal::*;
pub use dtype::*;
pub use field::*;
pub use half;
pub use minor::*;
pub use nullability::*;
pub use ptype::*;
pub use time::*;

mod decimal;
mod dtype;
mod field;
mod minor;
mod nullability;
mod ptype;
mod time;
