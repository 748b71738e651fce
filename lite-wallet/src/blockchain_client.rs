//! Blockchain RPC client for communicating with Ethereum-compatible nodes
//!
//! This module provides HTTP-based JSON-RPC communication with the node
//! configured as the wallet's provider endpoint.
use crate::errors::{WalletError, WalletResult};
use crate::types::Balance;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// HTTP client for blockchain RPC communication
pub struct BlockchainClient {
    client: Client,
    base_url: String,
    next_id: AtomicU64,
}

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<T: Serialize> {
    jsonrpc: &'static str,
    method: String,
    params: T,
    id: u64,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

/// JSON-RPC error structure
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
}

impl BlockchainClient {
    /// Create a new blockchain client
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> WalletResult<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            WalletError::NetworkError(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(BlockchainClient {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get account balance at the latest block
    pub async fn get_balance(&self, address: &str) -> WalletResult<Balance> {
        let params = serde_json::json!([address, "latest"]);
        let quantity: String = self.rpc_call("eth_getBalance", params).await?;
        Balance::from_hex_quantity(&quantity)
    }

    /// Make a JSON-RPC call to the node
    async fn rpc_call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> WalletResult<T> {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            method: method.to_string(),
            params,
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
        };

        let response = self
            .client
            .post(&self.base_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| WalletError::NetworkError(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(WalletError::NetworkError(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| WalletError::NetworkError(format!("Failed to read response: {}", e)))?;
        parse_rpc_response(&body)
    }
}

fn parse_rpc_response<T: for<'de> Deserialize<'de>>(body: &str) -> WalletResult<T> {
    let rpc_response: JsonRpcResponse<T> = serde_json::from_str(body)
        .map_err(|e| WalletError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    if let Some(error) = rpc_response.error {
        return Err(WalletError::NetworkError(format!(
            "RPC error {}: {}",
            error.code, error.message
        )));
    }

    rpc_response
        .result
        .ok_or_else(|| WalletError::InvalidResponse("No result in RPC response".to_string()))
}
