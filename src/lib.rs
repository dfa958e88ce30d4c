//! RFC 6570 URI Templates: expansion and extraction.
//!
//! A [`Template`] is parsed once into literal runs and expression nodes.
//! Each node can render itself against [`Bindings`] or compile itself into
//! a regex fragment, so the same template both builds URLs and recovers
//! the variables from them.

pub mod cli;
pub mod discover;
mod dispatch;
pub mod encode;
pub mod error;
pub mod expr;
pub mod fixture;
pub mod name;
pub mod operator;
pub mod output;
pub mod runner;
mod syntax;
pub mod template;
pub mod value;

pub use dispatch::parse as parse_expression;
pub use error::{Error, Result};
pub use expr::{Composite, Expression, FixedMulti, Flavor, Modifier, ModifierExpr, SingleValue};
pub use name::Name;
pub use operator::{CharClass, Operator};
pub use template::{Literal, Segment, Template};
pub use value::{Bindings, Value};
