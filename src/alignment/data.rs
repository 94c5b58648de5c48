//! Alignment record tag data.

mod tag;
mod value;

pub use self::{
    tag::Tag,
    value::{Array, Type, Value},
};
