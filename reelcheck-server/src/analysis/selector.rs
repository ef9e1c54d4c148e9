//! Candidate pair selection
//!
//! Enumerates the unordered asset pairs worth comparing under a rule:
//! both assets carry a scene number and the numbers differ (same-scene
//! comparisons are not continuity candidates). Assets without scene
//! metadata are silently excluded. Pure and lazy; identical input order
//! always yields identical output order, which keeps job results
//! reproducible byte for byte.

use reelcheck_common::models::Asset;

/// Lazy sequence of eligible unordered pairs in outer-then-inner index
/// order. Each unordered pair is produced exactly once.
pub fn candidate_pairs(assets: &[Asset]) -> impl Iterator<Item = (&Asset, &Asset)> {
    assets
        .iter()
        .enumerate()
        .flat_map(move |(i, a)| assets[i + 1..].iter().map(move |b| (a, b)))
        .filter(|(a, b)| match (a.scene_number(), b.scene_number()) {
            (Some(scene_a), Some(scene_b)) => scene_a != scene_b,
            _ => false,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use reelcheck_common::models::{MediaKind, SceneInfo};
    use uuid::Uuid;

    fn asset(name: &str, scene: Option<u32>) -> Asset {
        Asset {
            asset_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            kind: MediaKind::Image,
            filename: format!("{}.jpg", name),
            url: format!("https://assets.example.com/{}.jpg", name),
            scene_info: SceneInfo {
                scene_number: scene,
                ..SceneInfo::default()
            },
            metadata: serde_json::Map::new(),
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn same_scene_assets_are_never_paired() {
        let assets = vec![asset("a", Some(1)), asset("b", Some(1)), asset("c", Some(2))];
        let pairs: Vec<_> = candidate_pairs(&assets).collect();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].0.asset_id, assets[0].asset_id);
        assert_eq!(pairs[0].1.asset_id, assets[2].asset_id);
        assert_eq!(pairs[1].0.asset_id, assets[1].asset_id);
        assert_eq!(pairs[1].1.asset_id, assets[2].asset_id);
    }

    #[test]
    fn no_duplicate_unordered_pairs() {
        let assets: Vec<Asset> = (0..5).map(|i| asset(&format!("a{}", i), Some(i))).collect();
        let pairs: Vec<_> = candidate_pairs(&assets).collect();

        // 5 distinct scenes: C(5, 2) pairs
        assert_eq!(pairs.len(), 10);

        let mut seen = std::collections::HashSet::new();
        for (a, b) in pairs {
            let mut key = [a.asset_id, b.asset_id];
            key.sort();
            assert!(seen.insert(key), "pair produced twice");
        }
    }

    #[test]
    fn assets_without_scene_metadata_are_excluded() {
        let assets = vec![asset("a", Some(1)), asset("b", None), asset("c", Some(2))];
        let pairs: Vec<_> = candidate_pairs(&assets).collect();

        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.asset_id, assets[0].asset_id);
        assert_eq!(pairs[0].1.asset_id, assets[2].asset_id);
    }

    #[test]
    fn empty_and_single_inputs_yield_nothing() {
        assert_eq!(candidate_pairs(&[]).count(), 0);
        let one = vec![asset("a", Some(1))];
        assert_eq!(candidate_pairs(&one).count(), 0);
    }

    #[test]
    fn output_order_is_deterministic() {
        let assets: Vec<Asset> = (0..4).map(|i| asset(&format!("a{}", i), Some(i))).collect();
        let first: Vec<_> = candidate_pairs(&assets)
            .map(|(a, b)| (a.asset_id, b.asset_id))
            .collect();
        let second: Vec<_> = candidate_pairs(&assets)
            .map(|(a, b)| (a.asset_id, b.asset_id))
            .collect();
        assert_eq!(first, second);
    }
}
