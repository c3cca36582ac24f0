use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// POST /mcp_call request — invoke a tool by name.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallToolRequest {
    pub tool: String,
    /// Argument mapping passed through to the tool. Missing means empty.
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

/// Error body returned for any failed boundary call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// One entry in the GET /routes diagnostic listing.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteInfo {
    pub path: String,
    pub methods: Vec<String>,
}

/// GET /routes response.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoutesResponse {
    pub routes: Vec<RouteInfo>,
}
