// Competitive deck lookup tool (mocked tournament catalog)

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::tools::Tool;
use crate::types::AppResult;

/// Looks up tournament-winning deck lists.
///
/// The catalog is a fixture for now; the tool contract (natural-language
/// request in, structured deck listing out) is what the coordinator depends
/// on.
pub struct CompetitiveDecksTool;

#[derive(Deserialize)]
struct DecksInput {
    user_input: String,
}

#[async_trait]
impl Tool for CompetitiveDecksTool {
    fn name(&self) -> &str {
        "competitive_decks"
    }

    fn description(&self) -> &str {
        "Get competitive One Piece TCG deck recommendations from the gumgum.gg tournament \
         database. Takes a natural language description of the desired deck (leader, color, \
         set, region) and returns a tournament-winning deck list."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "user_input": {
                    "type": "string",
                    "description": "Natural language deck requirements, e.g. \"latest Red Zoro deck from OP10\""
                }
            },
            "required": ["user_input"]
        })
    }

    async fn execute(&self, input: Value) -> AppResult<Value> {
        let input: DecksInput = serde_json::from_value(input)?;
        info!(request = %input.user_input, "deck lookup");

        Ok(json!({
            "success": true,
            "source": "gumgum.gg",
            "message": "Tournament-winning deck data powered by www.gumgum.gg",
            "deck": {
                "name": "Red Zoro Tournament Deck",
                "set": "OP10",
                "region": "west",
                "leader": "OP03-001 Roronoa Zoro",
                "tournament": "Regional Championship",
                "event": "Summer 2025",
                "decklist": [
                    { "card_id": "OP03-001", "name": "Roronoa Zoro", "quantity": 4, "type": "Leader" },
                    { "card_id": "OP10-015", "name": "Monkey D. Luffy", "quantity": 4, "type": "Character" },
                    { "card_id": "OP09-022", "name": "Shanks", "quantity": 3, "type": "Character" },
                    { "card_id": "OP08-017", "name": "Eustass \"Captain\" Kid", "quantity": 3, "type": "Character" }
                ],
                "total_cards": 14
            },
            "metadata": {
                "competitive_level": "Tournament-winning",
                "disclaimer": "Deck data powered by www.gumgum.gg"
            }
        }))
    }
}
