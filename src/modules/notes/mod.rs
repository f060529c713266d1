pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sharenote_http::error::AppError;
use sharenote_kernel::{InitCtx, Module};
use sharenote_store::{Field, Filter, ListQuery, RecordStore};

use models::{NoteDetail, NoteSummary};

type SharedStore = Arc<dyn RecordStore>;

/// Read side of published notes: a public listing and lookup by slug
pub struct NotesModule {
    store: SharedStore,
}

impl NotesModule {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for NotesModule {
    fn name(&self) -> &'static str {
        "notes"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let store = &ctx.settings.store;
        let missing: Vec<&str> = [
            ("store.api_key", &store.api_key),
            ("store.base_id", &store.base_id),
            ("store.table", &store.table),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            anyhow::bail!("record store is not configured; missing {}", missing.join(", "));
        }

        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            table = %store.table,
            "notes module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        Router::new()
            .route("/", get(list_notes))
            .route("/{slug}", get(get_note))
            .with_state(self.store.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List public notes",
                        "description": "Published notes without a password",
                        "tags": ["Notes"],
                        "responses": {
                            "200": {
                                "description": "Public notes",
                                "content": {
                                    "application/json": {
                                        "schema": {
                                            "type": "array",
                                            "items": {"$ref": "#/components/schemas/NoteSummary"}
                                        }
                                    }
                                }
                            },
                            "502": {
                                "description": "Record store unavailable",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                },
                "/{slug}": {
                    "get": {
                        "summary": "Get a note by slug",
                        "tags": ["Notes"],
                        "parameters": [{
                            "name": "slug",
                            "in": "path",
                            "required": true,
                            "schema": {"type": "string"}
                        }],
                        "responses": {
                            "200": {
                                "description": "The note",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/NoteDetail"}
                                    }
                                }
                            },
                            "404": {
                                "description": "No note with this slug",
                                "content": {
                                    "application/json": {
                                        "schema": {"$ref": "#/components/schemas/ErrorResponse"}
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "NoteSummary": {
                        "type": "object",
                        "properties": {
                            "slug": {"type": "string"},
                            "title": {"type": "string"},
                            "createdAt": {"type": "string", "nullable": true}
                        },
                        "required": ["slug", "title"]
                    },
                    "NoteDetail": {
                        "type": "object",
                        "properties": {
                            "slug": {"type": "string"},
                            "title": {"type": "string"},
                            "data": {"type": "string", "description": "Markdown source"},
                            "createdAt": {"type": "string", "nullable": true}
                        },
                        "required": ["slug", "title", "data"]
                    }
                }
            }
        }))
    }
}

/// Notes without a password, in store order
async fn list_notes(State(store): State<SharedStore>) -> Result<Json<Vec<NoteSummary>>, AppError> {
    let records = store
        .list(&ListQuery::matching(Filter::field_empty(Field::Password)))
        .await?;

    Ok(Json(
        records.iter().filter_map(NoteSummary::from_record).collect(),
    ))
}

async fn get_note(
    State(store): State<SharedStore>,
    Path(slug): Path<String>,
) -> Result<Json<NoteDetail>, AppError> {
    if slug.trim().is_empty() {
        return Err(AppError::bad_request("slug must not be empty"));
    }

    let record = store
        .list(&ListQuery::matching(Filter::field_eq(Field::Slug, slug.as_str())).limit(1))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::not_found(format!("no note with slug '{slug}'")))?;

    Ok(Json(NoteDetail::from(record)))
}

/// Create a new instance of the notes module
pub fn create_module(store: SharedStore) -> Arc<dyn Module> {
    Arc::new(NotesModule::new(store))
}
