//! Server runtime options

use kindred_core::passcode::DEFAULT_PASSCODE_COST;

/// Default bind address
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Maximum request body size (1MB)
pub const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Options for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
    /// Request body limit in bytes
    pub body_limit: usize,
    /// bcrypt work factor for new tree passcodes
    pub passcode_cost: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            cors_origins: Vec::new(),
            body_limit: MAX_BODY_SIZE,
            passcode_cost: DEFAULT_PASSCODE_COST,
        }
    }
}

impl ServerConfig {
    pub fn with_bind(mut self, bind: impl Into<String>) -> Self {
        self.bind = bind.into();
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }

    pub fn with_passcode_cost(mut self, cost: u32) -> Self {
        self.passcode_cost = cost;
        self
    }
}
