use serde::Serialize;
use serde_json::{json, Value};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Offer, OfferWithOwner};
use crate::accounts::dto::AccountSummary;

/// Text fields of a publish form. Values arrive as multipart parts; absent
/// parts stay empty.
#[derive(Debug, Default)]
pub struct PublishFields {
    pub title: String,
    pub description: String,
    pub price: String,
    pub condition: String,
    pub city: String,
    pub brand: String,
    pub size: String,
    pub color: String,
}

impl PublishFields {
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "title" => self.title = value,
            "description" => self.description = value,
            "price" => self.price = value,
            "condition" => self.condition = value,
            "city" => self.city = value,
            "brand" => self.brand = value,
            "size" => self.size = value,
            "color" => self.color = value,
            _ => {}
        }
    }

    /// Labeled display attributes; the order is fixed and shown as-is.
    pub fn details(&self) -> Value {
        json!([
            { "BRAND": self.brand },
            { "SIZE": self.size },
            { "CONDITION": self.condition },
            { "COLOR": self.color },
            { "LOCATION": self.city },
        ])
    }
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub details: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<Value>,
    pub owner: AccountSummary,
    #[serde(rename = "createdAt")]
    pub created_at: OffsetDateTime,
}

impl OfferResponse {
    /// Response for a freshly published offer; the owner is the caller.
    pub fn published(offer: Offer, owner: AccountSummary) -> Self {
        Self {
            id: offer.id,
            title: offer.title,
            description: offer.description,
            price: offer.price,
            details: offer.details,
            image: offer.image,
            owner,
            created_at: offer.created_at,
        }
    }
}

impl From<OfferWithOwner> for OfferResponse {
    fn from(row: OfferWithOwner) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            details: row.details,
            image: row.image,
            owner: AccountSummary {
                username: row.owner_username,
                avatar: row.owner_avatar,
            },
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub count: i64,
    #[serde(rename = "matchedOffers")]
    pub matched_offers: Vec<OfferResponse>,
}
