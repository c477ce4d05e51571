use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;

use warden_application::ValidatedToken;

use crate::error::ApiResult;
use crate::state::AppState;

pub mod auth;
pub mod health;
pub mod permissions;
pub mod security;
