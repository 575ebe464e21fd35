use serde::{Deserialize, Serialize};

use crate::domain::{Product, ProductId};

/// Body for `POST /items` and `PUT /items/{id}`.
///
/// Clients send the full `{id, name}` pair. On create the id is a
/// client-generated placeholder that the server is free to replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    #[serde(default)]
    pub name: Option<String>,
}

impl From<&Product> for ProductBody {
    fn from(value: &Product) -> Self {
        Self {
            id: Some(value.id),
            name: Some(value.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

pub fn items_route() -> &'static str {
    "/items"
}

pub fn item_route(id: ProductId) -> String {
    format!("{}/{}", items_route(), id.0)
}
