use paystation_gateway::Gateway;

#[derive(Debug, Clone, axum::extract::FromRef)]
pub struct AppState {
    pub gateway: Gateway,
}

impl AppState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}
