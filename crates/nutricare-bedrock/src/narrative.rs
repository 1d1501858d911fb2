//! Diagnosis and plan drafting via the Bedrock Converse API.
//!
//! One in-flight request per invocation; the frontend disables the button
//! while a draft is pending. Failures are surfaced verbatim and never
//! retried automatically — the user re-invokes the action.

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, Message, SystemContentBlock,
};
use tracing::info;

use crate::error::BedrockError;

const DIAGNOSIS_SYSTEM_PROMPT: &str = "\
Eres un especialista en nutrición clínica. A partir del resumen de la
valoración, redacta un diagnóstico nutricional conciso: estado nutricional,
hallazgos de riesgo y cumplimiento del objetivo. Escribe en español, en
prosa, sin encabezados ni comentarios adicionales.";

const PLAN_SYSTEM_PROMPT: &str = "\
Eres un especialista en nutrición clínica. A partir del resumen de la
valoración, redacta un plan de manejo nutricional concreto: vía y fórmula,
metas calórico-proteicas y controles propuestos. Escribe en español, en
prosa, sin encabezados ni comentarios adicionales.";

/// Draft a nutritional diagnosis from a record summary.
pub async fn draft_diagnosis(
    config: &aws_config::SdkConfig,
    model_id: &str,
    summary: &str,
) -> Result<String, BedrockError> {
    generate(config, model_id, DIAGNOSIS_SYSTEM_PROMPT, summary).await
}

/// Draft a management plan from a record summary.
pub async fn draft_plan(
    config: &aws_config::SdkConfig,
    model_id: &str,
    summary: &str,
) -> Result<String, BedrockError> {
    generate(config, model_id, PLAN_SYSTEM_PROMPT, summary).await
}

/// Send one prompt through Converse and return the model's text. A
/// transport failure maps to `Invocation`; a response with no usable text
/// to `ResponseParse`.
pub async fn generate(
    config: &aws_config::SdkConfig,
    model_id: &str,
    system_prompt: &str,
    input: &str,
) -> Result<String, BedrockError> {
    let client = aws_sdk_bedrockruntime::Client::new(config);

    let message = Message::builder()
        .role(ConversationRole::User)
        .content(ContentBlock::Text(input.to_string()))
        .build()
        .map_err(|e| BedrockError::Invocation(e.to_string()))?;

    let response = client
        .converse()
        .model_id(model_id)
        .system(SystemContentBlock::Text(system_prompt.to_string()))
        .messages(message)
        .send()
        .await
        .map_err(|e| BedrockError::Invocation(e.into_service_error().to_string()))?;

    let output_message = response
        .output()
        .and_then(|o| o.as_message().ok())
        .ok_or_else(|| BedrockError::ResponseParse("no message in response".to_string()))?;

    let text = output_message
        .content()
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(t) = block {
                Some(t.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(BedrockError::ResponseParse(
            "model returned no text".to_string(),
        ));
    }

    info!(model_id, text_len = text.len(), "narrative draft complete");

    Ok(text)
}
