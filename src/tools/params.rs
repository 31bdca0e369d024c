//! Tool parameters that wrap an item id around the library's input contracts.

use infodiet::diet::validate::UpdateItemInput;
use schemars::JsonSchema;
use serde::Deserialize;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ItemIdParams {
    #[schemars(description = "UUID of the item")]
    pub id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateItemParams {
    #[schemars(description = "UUID of the item to update")]
    pub id: String,

    #[serde(flatten)]
    pub changes: UpdateItemInput,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FinishItemParams {
    #[schemars(description = "UUID of the item")]
    pub id: String,

    #[schemars(description = "Rating from 1 to 5")]
    pub rating: Option<i64>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GetProgressParams {
    #[schemars(description = "UUID of the item")]
    pub item_id: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct QuizMeArgs {
    #[schemars(description = "Optional topic to focus the quiz on")]
    pub topic: Option<String>,
}
