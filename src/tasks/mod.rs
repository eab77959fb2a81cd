pub mod model;
pub mod validate;

pub use model::{Task, TaskStatus};
pub use validate::{TaskPayload, ValidatedTask};
