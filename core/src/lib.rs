//! Blocking client for the appLariat REST API.
//!
//! # Overview
//! Every resource (`users`, `policy_schedules`) gets a service exposing
//! `list`, `get`, `create`, `update` and `delete`. Services delegate to a
//! small set of generic helpers in [`request`], which perform one HTTP round
//! trip each and decode the JSON envelope.
//!
//! ```no_run
//! use apl_core::{Client, ClientConfig, UserParams};
//!
//! # fn main() -> Result<(), apl_core::ApiError> {
//! let client = Client::new(ClientConfig::new("https://api.example.com/v1").bearer_token("token"))?;
//! let (users, _raw) = client.users.list(Some(&UserParams::user_type("user")))?;
//! println!("{} users", users.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - The network is only touched by an [`HttpExecutor`]. The default one is
//!   [`UreqExecutor`]. Tests inject their own.
//! - Calls never retry. Each returns `(value, raw response)` or an
//!   [`ApiError`].
//! - The client holds no mutable state and is `Send + Sync`.

pub mod client;
pub mod error;
pub mod http;
pub mod policy_schedule;
pub mod request;
pub mod transport;
pub mod types;
pub mod user;

pub use client::{Client, ClientConfig};
pub use error::ApiError;
pub use http::{HttpExecutor, HttpMethod, HttpRequest, HttpResponse, UreqExecutor};
pub use policy_schedule::{
    CronSchedule, IntervalSchedule, PolicySchedule, PolicyScheduleCreateInput, PolicyScheduleParams,
    PolicyScheduleService, PolicyScheduleUpdateInput, Schedule,
};
pub use request::ApiResult;
pub use transport::Transport;
pub use types::{CreateResult, DataEnvelope, ModifyResult, QueryParams};
pub use user::{User, UserCreateInput, UserParams, UserService, UserUpdateInput};
