//! Chat replies via the Bedrock Converse API.
//!
//! The whole transcript is sent on every call; Bedrock keeps no conversation
//! state of its own. The transcript must start with a human message and
//! alternate roles, which the conversation handler guarantees.

use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, ConverseOutput, Message, SystemContentBlock,
};
use chatkeep_core::error::ResponderError;
use chatkeep_core::models::{self, MessageHistory, Role};
use chatkeep_core::responder::{BoxFuture, ChatResponder};
use tracing::debug;

use crate::error::BedrockError;

/// [`ChatResponder`] that asks a Bedrock model for the next assistant turn.
#[derive(Debug, Clone)]
pub struct BedrockResponder {
    client: Client,
    model_id: String,
    system_prompt: String,
}

impl BedrockResponder {
    pub fn new(client: Client, model_id: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
        }
    }

    pub fn from_config(
        config: &aws_config::SdkConfig,
        model_id: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self::new(Client::new(config), model_id, system_prompt)
    }
}

impl ChatResponder for BedrockResponder {
    fn respond<'a>(
        &'a self,
        history: &'a MessageHistory,
    ) -> BoxFuture<'a, Result<models::Message, ResponderError>> {
        Box::pin(async move {
            let text =
                chat_converse(&self.client, &self.model_id, &self.system_prompt, history).await?;
            if text.trim().is_empty() {
                return Err(ResponderError::EmptyResponse);
            }
            Ok(models::Message::assistant(text))
        })
    }
}

/// Map a transcript onto Converse API messages, preserving order.
pub fn to_converse_messages(history: &MessageHistory) -> Result<Vec<Message>, BedrockError> {
    history
        .iter()
        .map(|msg| {
            let role = match msg.role() {
                Role::Human => ConversationRole::User,
                Role::Assistant => ConversationRole::Assistant,
            };
            Message::builder()
                .role(role)
                .content(ContentBlock::Text(msg.content().to_owned()))
                .build()
                .map_err(|e| BedrockError::Invocation(format!("building converse message: {e}")))
        })
        .collect()
}

/// Concatenate the text blocks of a Converse reply. Non-text blocks are skipped.
pub fn reply_text(output: Option<&ConverseOutput>) -> Result<String, BedrockError> {
    let Some(ConverseOutput::Message(message)) = output else {
        return Err(BedrockError::ResponseParse(
            "converse output carried no message".to_string(),
        ));
    };

    Ok(message
        .content()
        .iter()
        .filter_map(|block| block.as_text().ok())
        .map(String::as_str)
        .collect())
}

/// Send the transcript to Bedrock and return the assistant's reply text.
pub async fn chat_converse(
    client: &Client,
    model_id: &str,
    system_prompt: &str,
    history: &MessageHistory,
) -> Result<String, BedrockError> {
    let messages = to_converse_messages(history)?;
    debug!(model_id, messages = messages.len(), "invoking converse");

    let response = client
        .converse()
        .model_id(model_id)
        .system(SystemContentBlock::Text(system_prompt.to_owned()))
        .set_messages(Some(messages))
        .send()
        .await
        .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

    reply_text(response.output())
}
