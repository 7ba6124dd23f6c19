// Storefront search and cart tools (mocked Shopify-style catalog)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::tools::Tool;
use crate::types::AppResult;

/// Searches the store catalog for cards by name or id.
pub struct StorefrontSearchTool;

#[derive(Deserialize)]
struct SearchInput {
    query: String,
    #[serde(default)]
    #[allow(dead_code)]
    context: Option<String>,
}

#[async_trait]
impl Tool for StorefrontSearchTool {
    fn name(&self) -> &str {
        "storefront_search"
    }

    fn description(&self) -> &str {
        "Search the store catalog for One Piece TCG cards by card name or card ID. \
         Returns matching products with price, availability, and variant id."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": { "type": "string", "description": "Card name or ID to search for" },
                "context": { "type": "string", "description": "Optional extra context for the search" }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<Value> {
        let input: SearchInput = serde_json::from_value(input)?;
        info!(query = %input.query, "storefront search");

        let query = input.query.to_lowercase();
        let products = if query.contains("op03-001") || query.contains("zoro") {
            vec![json!({
                "title": "OP03-001 Roronoa Zoro (Leader)",
                "price": "24.99",
                "currency": "USD",
                "available": true,
                "url": "https://shop.example.com/products/op03-001-zoro",
                "variant_id": "gid://shopify/ProductVariant/12345"
            })]
        } else if query.contains("op10-015") || query.contains("luffy") {
            vec![json!({
                "title": "OP10-015 Monkey D. Luffy (Super Rare)",
                "price": "12.99",
                "currency": "USD",
                "available": true,
                "url": "https://shop.example.com/products/op10-015-luffy",
                "variant_id": "gid://shopify/ProductVariant/67890"
            })]
        } else {
            Vec::new()
        };

        Ok(json!({
            "success": true,
            "total_results": products.len(),
            "products": products,
            "source": "shopify"
        }))
    }
}

/// Creates, reads, and updates a shopping cart.
pub struct StorefrontCartTool;

#[derive(Deserialize)]
struct CartInput {
    action: String,
    #[serde(default)]
    cart_id: Option<String>,
    #[serde(default)]
    items: Option<Vec<Value>>,
}

#[async_trait]
impl Tool for StorefrontCartTool {
    fn name(&self) -> &str {
        "storefront_cart"
    }

    fn description(&self) -> &str {
        "Manage the shopping cart. Actions: \"create\" (optionally with items), \
         \"get\" (requires cart_id), \"update\" (requires cart_id and items). Each item \
         carries merchandise_id and quantity. Returns the cart with its checkout URL."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": { "type": "string", "enum": ["create", "get", "update"] },
                "cart_id": { "type": "string", "description": "Existing cart id (get/update)" },
                "items": {
                    "type": "array",
                    "description": "Line items with merchandise_id and quantity",
                    "items": {
                        "type": "object",
                        "properties": {
                            "merchandise_id": { "type": "string" },
                            "quantity": { "type": "integer" }
                        }
                    }
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<Value> {
        let input: CartInput = serde_json::from_value(input)?;
        info!(action = %input.action, cart = ?input.cart_id, "storefront cart");

        let response = match (input.action.as_str(), &input.cart_id, &input.items) {
            ("create", _, items) => {
                let cart_id = format!("gid://shopify/Cart/{}", Uuid::new_v4().simple());
                let token = cart_id.rsplit('/').next().unwrap_or_default().to_string();
                json!({
                    "success": true,
                    "cart": {
                        "id": cart_id,
                        "lines": items.clone().unwrap_or_default(),
                        "checkout_url": format!("https://shop.example.com/cart/{token}"),
                        "total_price": "0.00",
                        "currency": "USD"
                    },
                    "source": "shopify"
                })
            }
            ("get", Some(cart_id), _) => json!({
                "success": true,
                "cart": {
                    "id": cart_id,
                    "lines": [{
                        "line_item_id": "gid://shopify/CartLine/line1",
                        "merchandise_id": "gid://shopify/ProductVariant/12345",
                        "quantity": 1,
                        "title": "OP03-001 Roronoa Zoro (Leader)",
                        "price": "24.99"
                    }],
                    "checkout_url": format!("https://shop.example.com/cart/{cart_id}"),
                    "total_price": "24.99",
                    "currency": "USD"
                },
                "source": "shopify"
            }),
            ("update", Some(cart_id), Some(items)) => json!({
                "success": true,
                "cart": {
                    "id": cart_id,
                    "lines": items,
                    "checkout_url": format!("https://shop.example.com/cart/{cart_id}"),
                    "total_price": "37.98",
                    "currency": "USD"
                },
                "source": "shopify"
            }),
            (action, _, _) => json!({
                "success": false,
                "error": format!("Invalid action '{action}' or missing required parameters"),
                "source": "shopify"
            }),
        };

        Ok(response)
    }
}
