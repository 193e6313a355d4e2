use adcampaign_adapters::TextGenerator;
use adcampaign_core::state::{self, PRODUCT_INFO};
use adcampaign_core::{
    CampaignError, EventStream, ProductInfo, ProductParse, Result, Stage, StageContext,
    StageEvent, parse_product_info,
};
use adcampaign_telemetry::{Instrument, adapter_call_span};
use async_stream::stream;
use async_trait::async_trait;
use std::sync::Arc;

pub const PRODUCT_INFO_STAGE: &str = "product_info_agent";

/// Stand-in text when the run was started without any description.
pub const NO_INPUT: &str = "[No input received]";

const OUTPUT_KEYS: &[&str] = &[PRODUCT_INFO.name()];

pub fn extraction_prompt(raw_description: &str) -> String {
    format!(
        "Extract structured product info from the following description:\n\
         ---\n\
         {raw_description}\n\
         ---\n\
         Return JSON in this format:\n\
         {{\n\
         \x20   \"name\": \"...\",\n\
         \x20   \"description\": \"...\",\n\
         \x20   \"features\": [\"...\", \"...\"],\n\
         \x20   \"target_audience\": \"...\"\n\
         }}"
    )
}

pub fn summarize(product: &ProductInfo) -> String {
    format!(
        "name: {}\ndescription: {}\nfeatures: {}\ntarget_audience: {}",
        product.name,
        product.description,
        product.features_list(),
        product.target_audience
    )
}

/// Turns the free-text description into a structured [`ProductInfo`].
///
/// An unparseable model response is reported as a diagnostic event and
/// leaves `product_info` unset; the next stage then fails on the missing key.
pub struct ProductInfoStage {
    description: String,
    model: Arc<dyn TextGenerator>,
}

impl ProductInfoStage {
    pub fn new(model: Arc<dyn TextGenerator>) -> Self {
        Self { description: "Extracts structured product information".to_string(), model }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }
}

#[async_trait]
impl Stage for ProductInfoStage {
    fn name(&self) -> &str {
        PRODUCT_INFO_STAGE
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn output_keys(&self) -> &[&'static str] {
        OUTPUT_KEYS
    }

    async fn execute(&self, ctx: Arc<dyn StageContext>) -> Result<EventStream> {
        let model = self.model.clone();

        let s = stream! {
            let raw_text = match ctx.user_content().trim() {
                "" => NO_INPUT.to_string(),
                text => text.to_string(),
            };
            tracing::debug!(chars = raw_text.len(), "extracting product info");

            let response = match model
                .generate(&extraction_prompt(&raw_text))
                .instrument(adapter_call_span(model.name(), "extract_product"))
                .await
            {
                Ok(response) => response,
                Err(e) => {
                    yield Err(CampaignError::adapter(PRODUCT_INFO_STAGE, e));
                    return;
                }
            };

            match parse_product_info(&response) {
                ProductParse::Parsed(product) => {
                    if let Err(e) = state::write(ctx.store(), PRODUCT_INFO, &product) {
                        yield Err(e);
                        return;
                    }
                    tracing::info!(product = %product.name, features = product.features.len(), "product info stored");
                    yield Ok(StageEvent::new(ctx.invocation_id(), PRODUCT_INFO_STAGE, summarize(&product)));
                }
                ProductParse::Failed { raw, error } => {
                    tracing::warn!(error = %error, "model response is not valid product JSON");
                    yield Ok(StageEvent::new(
                        ctx.invocation_id(),
                        PRODUCT_INFO_STAGE,
                        format!("Error: {error}\nRaw Response: {raw}"),
                    ));
                }
            }
        };

        Ok(Box::pin(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_description() {
        let prompt = extraction_prompt("EcoBottle keeps drinks cold");
        assert!(prompt.contains("---\nEcoBottle keeps drinks cold\n---"));
        assert!(prompt.contains("\"target_audience\": \"...\""));
    }

    #[test]
    fn test_summary_lines() {
        let product = ProductInfo {
            name: "EcoBottle".into(),
            description: "reusable bottle".into(),
            features: vec!["insulated".into(), "leak-proof".into()],
            target_audience: "hikers".into(),
        };
        assert_eq!(
            summarize(&product),
            "name: EcoBottle\ndescription: reusable bottle\nfeatures: insulated, leak-proof\ntarget_audience: hikers"
        );
    }
}
