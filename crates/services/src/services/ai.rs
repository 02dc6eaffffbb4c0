//! Prompt flows for AI-assisted selling: discount suggestions for loyal
//! members and product recommendations from purchase history.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;
use ts_rs::TS;

use super::llm::{LlmClient, LlmError};

#[derive(Debug, Error)]
pub enum AiServiceError {
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),
}

/// Input for the discount flow, assembled by the route from the request body
/// and the point-value settings record.
#[derive(Debug, Clone)]
pub struct DiscountInput {
    pub cart_total: i64,
    pub member_points: i64,
    pub point_value_in_rp: i64,
}

/// Suggested discount, as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct DiscountSuggestion {
    pub discount_rp: i64,
    pub points_used: i64,
    pub message: String,
}

/// One line of a member's purchase history.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLine {
    pub product_name: String,
    pub quantity: i64,
}

/// Product recommendations, as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub products: Vec<String>,
    pub reasoning: Option<String>,
}

/// Service binding the prompt templates to the completion client. The actual
/// business judgement lives in the model; this layer only shapes the prompt
/// and parses the typed JSON reply.
#[derive(Debug, Clone)]
pub struct AiService {
    llm: LlmClient,
}

impl AiService {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    /// Ask the model for a discount a cashier can offer, funded by the
    /// member's loyalty points.
    pub async fn compute_discount(
        &self,
        input: &DiscountInput,
    ) -> Result<DiscountSuggestion, AiServiceError> {
        let prompt = format!(
            r#"A member is checking out at a point-of-sale.

## Checkout
- Cart total: Rp {cart_total}
- Member loyalty points: {member_points}
- Value of one point: Rp {point_value}

## Instructions
1. Decide how many points to redeem. Never redeem more points than the member has.
2. The discount is points_used * point value and must not exceed the cart total.
3. Write a short, friendly message for the cashier to read to the customer, in Indonesian.

## Output Format
Return ONLY valid JSON with this structure:
```json
{{
  "discountRp": 0,
  "pointsUsed": 0,
  "message": "..."
}}
```
"#,
            cart_total = input.cart_total,
            member_points = input.member_points,
            point_value = input.point_value_in_rp,
        );

        let system = Some(
            "You are the loyalty engine of a retail point-of-sale. Be conservative with \
             discounts and never exceed the limits stated in the prompt. Output valid JSON only."
                .to_string(),
        );

        let suggestion: DiscountSuggestion = self.llm.ask_json(&prompt, system).await?;
        info!(
            discount_rp = suggestion.discount_rp,
            points_used = suggestion.points_used,
            "Computed discount suggestion"
        );
        Ok(suggestion)
    }

    /// Ask the model for products to offer next, given what the member has
    /// bought before.
    pub async fn recommend_products(
        &self,
        history: &[PurchaseLine],
    ) -> Result<Recommendations, AiServiceError> {
        let history_lines = history
            .iter()
            .map(|line| format!("  - {} x{}", line.product_name, line.quantity))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            r#"Recommend products for a returning customer of a small retail store.

## Purchase History
{history_lines}

## Instructions
1. Suggest up to 3 product names the customer is likely to want next.
2. Prefer complements of what they already buy over repeats.

## Output Format
Return ONLY valid JSON:
```json
{{
  "products": ["..."],
  "reasoning": "one sentence"
}}
```
"#,
        );

        let system = Some(
            "You are a merchandising assistant for a retail point-of-sale. Be concise and \
             practical. Output valid JSON only."
                .to_string(),
        );

        Ok(self.llm.ask_json(&prompt, system).await?)
    }
}
