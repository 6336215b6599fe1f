use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct SubscribeRequest{
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UnsubscribeRequest{
    pub email: String,
}

#[derive(Serialize, Deserialize)]
pub struct HealthResponse{
    pub status: String,
    pub store: String,
}
