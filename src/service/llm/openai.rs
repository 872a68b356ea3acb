//! Integration with Large Language Model services.
//!
//! This module provides a thin wrapper around the OpenAI Responses API for
//! phrasing reply drafts.  A single attempt is made per draft, bounded by the
//! configured timeout; the composer falls back to its template on any failure.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::responses::{Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, Response, Role, TextConfig, TextResponseFormat},
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::base::{
    config::Config,
    prompts::{PROMPT_TICKET_MAX_CHARS, render_drafting_prompt},
    types::{DraftingContext, Res, truncate_chars},
};

use super::{GenericLlmClient, LlmClient};

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the drafting input.
    #[instrument(name = "OpenAiLlmClient::build_drafting_agent_input", skip_all)]
    fn build_drafting_agent_input(&self, context: &DraftingContext) -> Res<Input> {
        Ok(Input::Items(vec![
            InputItem::Message(
                InputMessageArgs::default()
                    .role(Role::Developer)
                    .content(format!("## Support Ticket Reference\n\n#{}\n\n", truncate_chars(&context.ticket_reference, PROMPT_TICKET_MAX_CHARS)))
                    .build()?,
            ),
            InputItem::Message(InputMessageArgs::default().role(Role::User).content(render_drafting_prompt(context)).build()?),
        ]))
    }

    /// Make a single OpenAI API call, bounded by the configured timeout.
    async fn call_openai_api(&self, request_builder: CreateResponseArgs) -> Res<Response> {
        let request = request_builder.build()?;
        let limit = self.config.external_timeout();

        match timeout(limit, self.client.responses().create(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(anyhow::anyhow!("OpenAI API call failed: {err}")),
            Err(_) => Err(anyhow::anyhow!("OpenAI API call timed out after {limit:?}")),
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::get_drafting_agent_response", skip_all)]
    async fn get_drafting_agent_response(&self, context: &DraftingContext) -> Res<String> {
        let input = self.build_drafting_agent_input(context)?;

        let text_config = TextConfig { format: TextResponseFormat::Text };

        let mut request = CreateResponseArgs::default();
        request
            .instructions(self.config.drafting_agent_system_directive.clone())
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_drafting_model)
            .text(text_config)
            .input(input);

        // Add the temperature for the non-reasoning models.
        if self.config.openai_drafting_model.starts_with("gpt") {
            request.temperature(self.config.openai_drafting_temperature);
        }

        let response = self.call_openai_api(request).await?;

        parse_openai_text(&response)
    }
}

/// Collect the text output of an OpenAI response.
#[instrument(skip_all)]
pub fn parse_openai_text(response: &Response) -> Res<String> {
    let mut parts = Vec::new();

    info!("LLM response has {} outputs.", response.output.len());
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => parts.push(text.text.clone()),
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unexpected output: {output:#?}");
            }
        }
    }

    let text = parts.join("\n\n").trim().to_string();
    if text.is_empty() {
        return Err(anyhow::anyhow!("LLM response contained no text."));
    }

    Ok(text)
}

// Tests.
