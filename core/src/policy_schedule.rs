//! The `policy_schedules` resource.
//!
//! A policy schedule binds a policy to a resource and says when it runs.
//!
//! # Design
//! `schedule` is decoded into a known shape when one matches exactly:
//! [`CronSchedule`] or [`IntervalSchedule`]. Any other JSON value, object or
//! not, is kept verbatim in [`Schedule::Other`], so one unusual row never
//! fails a whole list. `inputs` carries policy-specific arguments and has no
//! fixed schema, so it is a plain [`Value`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::request::{self, ApiResult};
use crate::transport::Transport;
use crate::types::{append_filter, CreateResult, ModifyResult, QueryParams};

/// When a policy runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Schedule {
    Cron(CronSchedule),
    Interval(IntervalSchedule),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CronSchedule {
    pub cron_expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntervalSchedule {
    pub interval_seconds: u64,
    /// RFC 3339 timestamp of the first run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
}

impl Schedule {
    pub fn cron(expression: impl Into<String>) -> Self {
        Schedule::Cron(CronSchedule {
            cron_expression: expression.into(),
            timezone: None,
        })
    }

    pub fn every(seconds: u64) -> Self {
        Schedule::Interval(IntervalSchedule {
            interval_seconds: seconds,
            start_time: None,
        })
    }
}

/// A policy_schedule row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySchedule {
    pub id: String,
    pub name: String,
    pub resource_id: String,
    pub resource_type: String,
    pub policy_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_user_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyScheduleCreateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub resource_id: String,
    pub resource_type: String,
    pub policy_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

/// Partial update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyScheduleUpdateInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyScheduleParams {
    pub name: Option<String>,
    pub resource_id: Option<String>,
    pub resource_type: Option<String>,
    pub policy_id: Option<String>,
    pub status: Option<String>,
}

impl QueryParams for PolicyScheduleParams {
    fn populate_qp(&self, qp: &mut form_urlencoded::Serializer<'_, String>) {
        append_filter(qp, "name", &self.name);
        append_filter(qp, "resource_id", &self.resource_id);
        append_filter(qp, "resource_type", &self.resource_type);
        append_filter(qp, "policy_id", &self.policy_id);
        append_filter(qp, "status", &self.status);
    }
}

/// Operations on `policy_schedules`.
#[derive(Debug, Clone)]
pub struct PolicyScheduleService {
    transport: Transport,
    endpoint: &'static str,
}

impl PolicyScheduleService {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            endpoint: "policy_schedules",
        }
    }

    pub fn list(&self, params: Option<&PolicyScheduleParams>) -> ApiResult<Vec<PolicySchedule>> {
        request::do_list(&self.transport, self.endpoint, params)
    }

    pub fn get(&self, id: &str) -> ApiResult<PolicySchedule> {
        request::do_get(&self.transport, self.endpoint, id)
    }

    pub fn get_opt(&self, id: &str) -> Result<Option<PolicySchedule>, ApiError> {
        request::optional(self.get(id))
    }

    pub fn create(&self, input: &PolicyScheduleCreateInput) -> ApiResult<CreateResult> {
        request::do_create(&self.transport, self.endpoint, input)
    }

    pub fn update(&self, id: &str, input: &PolicyScheduleUpdateInput) -> ApiResult<ModifyResult> {
        request::do_update(&self.transport, self.endpoint, id, input)
    }

    pub fn delete(&self, id: &str) -> ApiResult<ModifyResult> {
        request::do_delete(&self.transport, self.endpoint, id)
    }
}
