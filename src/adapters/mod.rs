// Adapters layer: concrete command runners behind the `CommandRunner` port.

pub mod mock;
pub mod process;
