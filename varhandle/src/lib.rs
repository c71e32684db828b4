mod array;
mod bounds;
mod buffer;
mod capability;
mod class;
mod dispatch;
mod error;
mod handle;
mod location;
mod lookup;
mod memory;
mod mode;
mod registry;
mod signature;
mod storage;
pub mod stress;
mod typed;
mod types;
mod value;

pub use array::{Array, MAX_LENGTH};
pub use buffer::ByteBuffer;
pub use capability::*;
pub use class::*;
pub use error::*;
pub use handle::{ModeInvoker, VarHandle};
pub use lookup::*;
pub use mode::*;
pub use registry::ClassRegistry;
pub use signature::access_mode_type;
pub use storage::Storage;
pub use typed::{Primitive, TypedVarHandle};
pub use types::*;
pub use value::*;
