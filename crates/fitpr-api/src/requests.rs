//! Request types for the API

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// PIN-based client sign in
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPinRequest {
    pub client_id: String,
    pub pin: String,
}
