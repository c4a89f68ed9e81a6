pub use hcl_edit as hcl;
pub use reqwest;

pub mod audit;
pub mod errors;
pub mod findings;
pub mod parser;
pub mod reporter;
pub mod schema;
pub mod validation;

pub use errors::Error;
pub use findings::Finding;
