pub mod schema;
pub mod queries;
pub mod mutations;
pub mod types;

pub use schema::{build_schema, AppSchema};
pub use queries::QueryRoot;
pub use mutations::MutationRoot;
