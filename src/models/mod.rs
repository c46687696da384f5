pub mod issue;
pub mod project;
pub mod user;
pub mod worklog;
pub mod search;

pub use issue::*;
pub use project::*;
pub use user::*;
pub use worklog::*;
pub use search::*;
