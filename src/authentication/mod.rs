mod extract;
mod middleware;
mod password;
mod token;

pub use extract::{AuthenticatedUserId, WorkflowCaller, WORKFLOW_SECRET_HEADER};
pub use middleware::BearerAuthLayer;
pub use password::{hash_password, validate_credentials, AuthError, Credentials};
pub use token::{TokenError, TokenSigner};
