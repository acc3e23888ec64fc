// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in web search tool for the research agent.
//!
//! Posts to a Tavily-compatible search endpoint. Results are flattened
//! to a titled text list; failures come back as recoverable error
//! outputs so the agent can answer gracefully without live search.

use async_trait::async_trait;
use serde::Deserialize;
use verdant_config::model::SearchConfig;
use verdant_core::VerdantError;

use crate::tool::{Tool, ToolOutput};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

/// Searches the web through the configured search API.
pub struct WebSearchTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    max_results: usize,
}

impl WebSearchTool {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            max_results: config.max_results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for up-to-date plant care information and general knowledge"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, input: serde_json::Value) -> Result<ToolOutput, VerdantError> {
        let Some(query) = input["query"].as_str().map(str::trim) else {
            return Ok(ToolOutput::error("Error: missing 'query' parameter"));
        };
        if query.is_empty() {
            return Ok(ToolOutput::error("Error: missing 'query' parameter"));
        }

        let Some(api_key) = &self.api_key else {
            return Ok(ToolOutput::error(
                "Error: web search is not configured. Set search.api_key in the configuration.",
            ));
        };

        let body = serde_json::json!({
            "api_key": api_key,
            "query": query,
            "max_results": self.max_results,
        });
        let response = match self.client.post(&self.base_url).json(&body).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "web search request failed");
                return Ok(ToolOutput::error(format!("Error searching the web: {e}")));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, "web search returned error status");
            return Ok(ToolOutput::error(format!(
                "Error searching the web: search API returned {status}"
            )));
        }

        let parsed: SearchResponse = match response.json().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "web search response did not parse");
                return Ok(ToolOutput::error(format!("Error searching the web: {e}")));
            }
        };

        if parsed.results.is_empty() {
            return Ok(ToolOutput::text("No search results found."));
        }

        let formatted: Vec<String> = parsed
            .results
            .iter()
            .map(|r| format!("{}\n{}\n{}", r.title, r.url, r.content))
            .collect();
        Ok(ToolOutput::text(format!(
            "Search results for '{query}':\n\n{}",
            formatted.join("\n\n")
        )))
    }
}
