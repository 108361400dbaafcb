//! Qdrant vector DB helpers: connection, collection reset, batched upserts,
//! and top-K search using the builder-style `qdrant_client` API.
//!
//! This module does **not** read documents or create embeddings, only DB I/O.

use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, ScoredPoint, SearchPointsBuilder,
    UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::json;
use uuid::Uuid;

use crate::errors::knowledge_error::KnowledgeError;
use crate::structs::document::{Chunk, Snippet};
use crate::structs::knowledge_config::QdrantConfig;

/// Build a gRPC client for `cfg.url`. Does not touch any collection.
pub fn connect(cfg: &QdrantConfig) -> Result<Qdrant, KnowledgeError> {
    let mut builder = Qdrant::from_url(&cfg.url);
    if let Some(key) = &cfg.api_key {
        builder = builder.api_key(key.clone());
    }
    builder
        .build()
        .map_err(|e| KnowledgeError::Qdrant(format!("client build: {e}")))
}

/// Drop the collection (if present) and create it again with cosine distance.
pub async fn reset_collection(client: &Qdrant, cfg: &QdrantConfig) -> Result<(), KnowledgeError> {
    // Not-found is fine here.
    let _ = client.delete_collection(&cfg.collection).await;

    client
        .create_collection(
            CreateCollectionBuilder::new(&cfg.collection)
                .vectors_config(VectorParamsBuilder::new(cfg.dim as u64, Distance::Cosine)),
        )
        .await
        .map_err(|e| KnowledgeError::Qdrant(format!("create_collection: {e}")))?;

    Ok(())
}

/// Deterministic point id derived from the chunk id.
pub fn point_id(chunk_id: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, chunk_id.as_bytes()).to_string()
}

fn chunk_payload(chunk: &Chunk) -> Result<Payload, KnowledgeError> {
    json!({
        "chunk_id": chunk.id,
        "source": chunk.source,
        "chunk_index": chunk.chunk_index,
        "text": chunk.text,
    })
    .try_into()
    .map_err(|e| KnowledgeError::Qdrant(format!("payload convert: {e}")))
}

/// Upsert `(chunk, vector)` pairs. Returns the number of written points.
///
/// # Errors
/// - `InvalidConfig` if a vector length differs from `cfg.dim`
/// - `Qdrant` on transport/server errors
pub async fn upsert_batch(
    client: &Qdrant,
    cfg: &QdrantConfig,
    batch: Vec<(&Chunk, Vec<f32>)>,
) -> Result<usize, KnowledgeError> {
    if batch.is_empty() {
        return Ok(0);
    }

    let mut points = Vec::with_capacity(batch.len());
    for (chunk, vector) in batch {
        check_dim(cfg, vector.len(), &chunk.id)?;
        points.push(PointStruct::new(point_id(&chunk.id), vector, chunk_payload(chunk)?));
    }
    let written = points.len();

    client
        .upsert_points(UpsertPointsBuilder::new(&cfg.collection, points).wait(true))
        .await
        .map_err(|e| KnowledgeError::Qdrant(format!("upsert_points: {e}")))?;

    Ok(written)
}

/// k-NN search for a query vector; hits come back in descending score order.
pub async fn search_top_k(
    client: &Qdrant,
    cfg: &QdrantConfig,
    query_vec: Vec<f32>,
    k: usize,
    min_score: Option<f32>,
) -> Result<Vec<Snippet>, KnowledgeError> {
    check_dim(cfg, query_vec.len(), "query")?;

    let mut builder =
        SearchPointsBuilder::new(&cfg.collection, query_vec, k as u64).with_payload(true);
    if let Some(t) = min_score {
        builder = builder.score_threshold(t);
    }

    let resp = client
        .search_points(builder)
        .await
        .map_err(|e| KnowledgeError::Qdrant(format!("search_points: {e}")))?;

    Ok(resp.result.into_iter().map(scored_point_to_snippet).collect())
}

fn check_dim(cfg: &QdrantConfig, len: usize, what: &str) -> Result<(), KnowledgeError> {
    if len != cfg.dim {
        return Err(KnowledgeError::InvalidConfig(format!(
            "vector length {len} != EMBEDDING_DIM {} for {what}",
            cfg.dim
        )));
    }
    Ok(())
}

/// Payload fields missing or mistyped fall back to empty strings.
fn scored_point_to_snippet(sp: ScoredPoint) -> Snippet {
    let field = |name: &str| {
        sp.payload
            .get(name)
            .and_then(|v| v.clone().into_json().as_str().map(str::to_owned))
            .unwrap_or_default()
    };

    Snippet {
        text: field("text"),
        source: field("source"),
        score: sp.score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_ids_are_stable_uuids() {
        let a = point_id("plans/iptv.md#0");
        assert_eq!(a, point_id("plans/iptv.md#0"));
        assert_ne!(a, point_id("plans/iptv.md#1"));
        assert!(Uuid::parse_str(&a).is_ok());
    }

    #[test]
    fn dimension_mismatch_is_config_error() {
        let cfg = QdrantConfig::default();
        assert!(check_dim(&cfg, 768, "q").is_ok());
        assert!(matches!(
            check_dim(&cfg, 3, "q"),
            Err(KnowledgeError::InvalidConfig(_))
        ));
    }
}
