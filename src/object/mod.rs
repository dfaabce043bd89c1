//! The PDF object model: the seven value kinds with their canonical byte
//! encodings, and the indirect-object table. The table is an owned
//! arena that supports `allocate`-then-`bind` forward references, so a
//! page tree's parent/child links can be wired up before every node has
//! a final value.

mod table;
mod value;

pub use table::{ObjectId, ObjectTable};
pub use value::{Dictionary, Value};
pub(crate) use value::write_name;
