//! Asset catalog storage
//!
//! Read-only to the analysis pipeline. Listing order is fixed (upload
//! time, then id) so candidate selection over a full catalog is
//! reproducible run to run.

use reelcheck_common::models::{Asset, MediaKind, SceneInfo};
use reelcheck_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::projects::{parse_timestamp, parse_uuid};

pub async fn create_asset(pool: &SqlitePool, asset: &Asset) -> Result<()> {
    let kind = serde_json::to_string(&asset.kind)
        .map_err(|e| Error::Internal(format!("Failed to serialize kind: {}", e)))?;
    let scene_info = serde_json::to_string(&asset.scene_info)
        .map_err(|e| Error::Internal(format!("Failed to serialize scene_info: {}", e)))?;
    let metadata = serde_json::to_string(&asset.metadata)
        .map_err(|e| Error::Internal(format!("Failed to serialize metadata: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO assets (
            asset_id, project_id, kind, filename, url,
            scene_info, metadata, uploaded_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(asset.asset_id.to_string())
    .bind(asset.project_id.to_string())
    .bind(kind)
    .bind(&asset.filename)
    .bind(&asset.url)
    .bind(scene_info)
    .bind(metadata)
    .bind(asset.uploaded_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// All assets of a project in catalog order
pub async fn list_assets(pool: &SqlitePool, project_id: Uuid) -> Result<Vec<Asset>> {
    let rows = sqlx::query(
        r#"
        SELECT asset_id, project_id, kind, filename, url,
               scene_info, metadata, uploaded_at
        FROM assets
        WHERE project_id = ?
        ORDER BY uploaded_at, asset_id
        "#,
    )
    .bind(project_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(asset_from_row).collect()
}

pub async fn get_asset(pool: &SqlitePool, project_id: Uuid, asset_id: Uuid) -> Result<Option<Asset>> {
    let row = sqlx::query(
        r#"
        SELECT asset_id, project_id, kind, filename, url,
               scene_info, metadata, uploaded_at
        FROM assets
        WHERE project_id = ? AND asset_id = ?
        "#,
    )
    .bind(project_id.to_string())
    .bind(asset_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(asset_from_row).transpose()
}

/// Fetch assets by id, preserving request order. Ids that do not exist in
/// the project are silently omitted.
pub async fn get_assets(pool: &SqlitePool, project_id: Uuid, ids: &[Uuid]) -> Result<Vec<Asset>> {
    let mut assets = Vec::with_capacity(ids.len());
    for &asset_id in ids {
        if let Some(asset) = get_asset(pool, project_id, asset_id).await? {
            assets.push(asset);
        }
    }
    Ok(assets)
}

fn asset_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Asset> {
    let asset_id: String = row.get("asset_id");
    let project_id: String = row.get("project_id");
    let kind: String = row.get("kind");
    let kind: MediaKind = serde_json::from_str(&kind)
        .map_err(|e| Error::Internal(format!("Failed to deserialize kind: {}", e)))?;
    let scene_info: String = row.get("scene_info");
    let scene_info: SceneInfo = serde_json::from_str(&scene_info)
        .map_err(|e| Error::Internal(format!("Failed to deserialize scene_info: {}", e)))?;
    let metadata: String = row.get("metadata");
    let uploaded_at: String = row.get("uploaded_at");

    Ok(Asset {
        asset_id: parse_uuid(&asset_id, "asset_id")?,
        project_id: parse_uuid(&project_id, "project_id")?,
        kind,
        filename: row.get("filename"),
        url: row.get("url"),
        scene_info,
        metadata: serde_json::from_str(&metadata)
            .map_err(|e| Error::Internal(format!("Failed to deserialize metadata: {}", e)))?,
        uploaded_at: parse_timestamp(&uploaded_at, "uploaded_at")?,
    })
}
