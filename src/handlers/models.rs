//! # Model Listing
//!
//! `GET /v1/models` shows which logical model keys the relay accepts and what
//! each one resolves to on the backend.
//!
//! ## Response:
//! ```json
//! {
//!   "default": "mini",
//!   "models": [
//!     {
//!       "key": "mini",
//!       "identifier": "mistralai/Voxtral-Mini-3B-2507",
//!       "backend_name": "Voxtral-Mini-3B-2507",
//!       "description": "Base 3B model (~6GB RAM)",
//!       "default": true
//!     }
//!   ]
//! }
//! ```

use crate::state::AppState;
use crate::transcription::catalog::ModelEntry;
use actix_web::{web, HttpResponse};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ModelInfoResponse {
    pub key: &'static str,
    pub identifier: &'static str,
    pub backend_name: &'static str,
    pub description: &'static str,
    pub default: bool,
}

impl ModelInfoResponse {
    fn from_entry(entry: &'static ModelEntry, default: &ModelEntry) -> Self {
        Self {
            key: entry.key,
            identifier: entry.identifier,
            backend_name: entry.backend_name(),
            description: entry.description,
            default: entry == default,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub default: &'static str,
    pub models: Vec<ModelInfoResponse>,
}

pub async fn list_models(state: web::Data<AppState>) -> HttpResponse {
    let default = state.catalog.default_entry();
    let models = state
        .catalog
        .entries()
        .iter()
        .map(|entry| ModelInfoResponse::from_entry(entry, default))
        .collect();

    HttpResponse::Ok().json(ModelListResponse {
        default: default.key,
        models,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use actix_web::{test, App};

    #[actix_web::test]
    async fn test_lists_catalog_with_default_marked() {
        let mut config = AppConfig::default();
        config.models.default_model = "mini_q4".to_string();
        let state = AppState::new(config).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/v1/models", web::get().to(list_models)),
        )
        .await;
        let request = test::TestRequest::get().uri("/v1/models").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, request).await;

        assert_eq!(body["default"], "mini_q4");
        let models = body["models"].as_array().unwrap();
        assert_eq!(models.len(), 4);

        let defaults: Vec<_> = models.iter().filter(|m| m["default"] == true).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0]["identifier"], "voxtral-mini-q4");

        let mini = models.iter().find(|m| m["key"] == "mini").unwrap();
        assert_eq!(mini["backend_name"], "Voxtral-Mini-3B-2507");
    }
}
