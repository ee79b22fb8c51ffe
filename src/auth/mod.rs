pub mod csrf;
pub mod guard;
pub mod handlers;
pub mod password;
pub mod principal;
pub mod repository;
pub mod session;

// Re-export commonly used items
pub use guard::{authorize, require_privilege, Decision, DenyReason};
pub use handlers::{login_form_submit, login_handler, login_user, logout_user, LoginRequest, LoginResponse};
pub use principal::{parse_privileges, Principal, PrivilegeRequirement, SUPER_PRIVILEGE};
pub use repository::CredentialRepository;
