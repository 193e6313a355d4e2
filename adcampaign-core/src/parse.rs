use crate::types::ProductInfo;

/// Outcome of parsing the product extraction response.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductParse {
    Parsed(ProductInfo),
    Failed { raw: String, error: String },
}

impl ProductParse {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Self::Parsed(_))
    }
}

/// Removes the Markdown code fence a model may wrap around a JSON payload.
pub fn strip_code_fence(raw: &str) -> &str {
    let mut data = raw.trim();
    if let Some(rest) = data.strip_prefix("```json") {
        data = rest.trim();
    } else if let Some(rest) = data.strip_prefix("```") {
        data = rest.trim();
    }
    if let Some(rest) = data.strip_suffix("```") {
        data = rest.trim();
    }
    data
}

pub fn parse_product_info(raw: &str) -> ProductParse {
    match serde_json::from_str::<ProductInfo>(strip_code_fence(raw)) {
        Ok(product) => ProductParse::Parsed(product),
        Err(e) => ProductParse::Failed { raw: raw.trim().to_string(), error: e.to_string() },
    }
}
