//! User directory business logic.
//!
//! The query behind `select_user` is a stand-in for a real directory
//! backend: it returns a single synthetic record whose fixed fields come
//! from configuration. The calling convention around it — schema, typed
//! arguments, registration — is the real contract.

use serde::{Deserialize, Serialize};

use crate::config::UsersConfig;
use crate::tools::{
    FieldType, ObjectSchema, RegistryError, ToolDescriptor, ToolHandler, ToolOutput, ToolRegistry,
};

/// Arguments accepted by `select_user`.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectUserArgs {
    /// Name of the user to look up.
    pub username: String,
}

/// One user record as returned by the directory.
///
/// Field order here is the wire field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Numeric user ID.
    pub id: i64,
    /// Account username.
    pub username: String,
    /// Contact email address.
    pub email: String,
    /// Whether the account is active.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Contact phone number.
    pub phone: String,
}

const fn default_active() -> bool {
    true
}

/// Looks up users matching `username`.
///
/// Synthetic single-record result standing in for a directory query.
#[must_use]
pub fn select_user(username: &str, config: &UsersConfig) -> Vec<UserRecord> {
    tracing::info!(username = %username, "Looking up user");

    vec![UserRecord {
        id: 1,
        username: username.to_string(),
        email: config.email.clone(),
        is_active: true,
        phone: config.phone.clone(),
    }]
}

/// Registers the user directory tools.
///
/// # Errors
///
/// Returns an error if a tool name collides with an existing registration.
pub fn register_tools(
    registry: &mut ToolRegistry,
    config: &UsersConfig,
) -> Result<(), RegistryError> {
    let descriptor = ToolDescriptor::new(
        "select_user",
        "Look up user information by username",
        ObjectSchema::new().required("username", FieldType::String, "Name of the user to look up"),
    );

    let config = config.clone();
    let handler: ToolHandler = Box::new(move |args| {
        let args: SelectUserArgs = args.parse()?;
        let users = select_user(&args.username, &config);
        Ok(ToolOutput::from_records(&users)?)
    });

    registry.register(descriptor, handler)
}
