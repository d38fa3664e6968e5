pub mod accounts;
pub mod credentials;
pub mod domain;
pub mod error;
pub mod identity;
pub mod lifecycle;
pub mod policy;
pub mod ports;
pub mod presence;
pub mod token;

pub use accounts::{AccountService, LoginOutcome};
pub use domain::{
    Equipment, Identity, NewSubmission, Role, Submission, SubmissionEdit, SubmissionFields,
    SubmissionStatus, SubmissionWithOwner, UploadedDocument, User, UserCredentials,
};
pub use error::{AuthError, ServiceError, ServiceResult, TokenError, ValidationError};
pub use identity::IdentityResolver;
pub use lifecycle::SubmissionService;
pub use ports::{DatabaseService, DocumentStore, PortError, PortResult};
pub use presence::PresenceTracker;
pub use token::{SessionClaims, TokenService};
