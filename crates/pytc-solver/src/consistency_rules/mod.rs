//! Rule families for the consistency engine, one module per concern.

pub(crate) mod arguments;
pub(crate) mod nominal;
