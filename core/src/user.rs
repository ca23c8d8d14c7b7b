//! The `users` resource.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::ApiError;
use crate::request::{self, ApiResult};
use crate::transport::Transport;
use crate::types::{append_filter, CreateResult, ModifyResult, QueryParams};

/// A user row as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub user_type: String,
    pub work_role: String,
    pub role_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_user_id: Option<String>,
}

/// Payload for creating a user. Leave `id` unset to let the server pick one.
///
/// `password` is write-only and is never echoed back in a [`User`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub user_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

/// Partial update of a user. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

/// Equality filters for [`UserService::list`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserParams {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub user_type: Option<String>,
    pub work_role: Option<String>,
    pub role_id: Option<String>,
}

impl UserParams {
    pub fn user_type(user_type: impl Into<String>) -> Self {
        Self {
            user_type: Some(user_type.into()),
            ..Self::default()
        }
    }
}

impl QueryParams for UserParams {
    fn populate_qp(&self, qp: &mut form_urlencoded::Serializer<'_, String>) {
        append_filter(qp, "first_name", &self.first_name);
        append_filter(qp, "last_name", &self.last_name);
        append_filter(qp, "email", &self.email);
        append_filter(qp, "user_type", &self.user_type);
        append_filter(qp, "work_role", &self.work_role);
        append_filter(qp, "role_id", &self.role_id);
    }
}

/// Operations on `users`.
#[derive(Debug, Clone)]
pub struct UserService {
    transport: Transport,
    endpoint: &'static str,
}

impl UserService {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            endpoint: "users",
        }
    }

    /// List users, optionally filtered.
    pub fn list(&self, params: Option<&UserParams>) -> ApiResult<Vec<User>> {
        request::do_list(&self.transport, self.endpoint, params)
    }

    /// Get the user with `id`. A missing user is `ApiError::NotFound`.
    pub fn get(&self, id: &str) -> ApiResult<User> {
        request::do_get(&self.transport, self.endpoint, id)
    }

    /// Like [`UserService::get`], with a missing user as `None`.
    pub fn get_opt(&self, id: &str) -> Result<Option<User>, ApiError> {
        request::optional(self.get(id))
    }

    pub fn create(&self, input: &UserCreateInput) -> ApiResult<CreateResult> {
        request::do_create(&self.transport, self.endpoint, input)
    }

    pub fn update(&self, id: &str, input: &UserUpdateInput) -> ApiResult<ModifyResult> {
        request::do_update(&self.transport, self.endpoint, id, input)
    }

    pub fn delete(&self, id: &str) -> ApiResult<ModifyResult> {
        request::do_delete(&self.transport, self.endpoint, id)
    }
}
