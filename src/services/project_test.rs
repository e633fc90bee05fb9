use serde_json::json;

use super::*;

fn row(root: &Path, scene_state: Option<serde_json::Value>) -> ProjectRow {
    ProjectRow {
        id: Uuid::nil(),
        doctor_id: None,
        patient_name: "Petrov".into(),
        doctor_display_name: Some("Dr Ivanova".into()),
        file_path_root: root.to_string_lossy().into_owned(),
        scene_state,
    }
}

// =============================================================================
// normalize_scene_state
// =============================================================================

#[test]
fn normalize_null_stays_null() {
    assert_eq!(normalize_scene_state(&serde_json::Value::Null).unwrap(), serde_json::Value::Null);
}

#[test]
fn normalize_unwraps_json_text() {
    let raw = json!("[{\"id\":\"stl-0\",\"color\":\"#ff0000\"}]");
    assert_eq!(normalize_scene_state(&raw).unwrap(), json!([{ "id": "stl-0", "color": "#ff0000" }]));
}

#[test]
fn normalize_drops_entries_without_id() {
    let raw = json!([{ "id": "stl-0", "visible": false }, { "visible": true }]);
    assert_eq!(normalize_scene_state(&raw).unwrap(), json!([{ "id": "stl-0", "visible": false }]));
}

#[test]
fn normalize_rejects_object() {
    assert!(normalize_scene_state(&json!({ "id": "stl-0" })).is_err());
}

// =============================================================================
// scene_for_row
// =============================================================================

#[tokio::test]
async fn scene_for_row_lists_meshes_with_public_urls() {
    let tmp = tempfile::tempdir().unwrap();
    let storage_root = tmp.path().join("storage");
    let project_root = storage_root.join("KZ").join("Pat");
    std::fs::create_dir_all(project_root.join("stl")).unwrap();
    std::fs::write(project_root.join("stl").join("upper.stl"), b"").unwrap();
    std::fs::write(project_root.join("stl").join("lower.stl"), b"").unwrap();

    let scene = scene_for_row(&row(&project_root, None), &storage_root, "http://localhost:8000").await.unwrap();

    assert_eq!(scene.project.patient_name, "Petrov");
    assert_eq!(scene.scene_state, serde_json::Value::Null);
    let ids: Vec<_> = scene.stl_files.iter().map(|f| f.id.as_str()).collect();
    assert_eq!(ids, vec!["stl-0", "stl-1"]);
    assert_eq!(scene.stl_files[0].name, "lower.stl");
    assert_eq!(scene.stl_files[0].url, "http://localhost:8000/storage/KZ/Pat/stl/lower.stl");
}

#[tokio::test]
async fn scene_for_row_serves_unreadable_state_as_null() {
    let tmp = tempfile::tempdir().unwrap();
    let scene = scene_for_row(&row(tmp.path(), Some(json!(42))), tmp.path(), "http://x").await.unwrap();
    assert!(scene.stl_files.is_empty());
    assert_eq!(scene.scene_state, serde_json::Value::Null);
}

#[tokio::test]
async fn scene_for_row_passes_saved_state_through() {
    let tmp = tempfile::tempdir().unwrap();
    let saved = json!([{ "id": "stl-0", "opacity": 0.5 }]);
    let scene = scene_for_row(&row(tmp.path(), Some(saved.clone())), tmp.path(), "http://x").await.unwrap();
    assert_eq!(scene.scene_state, saved);
}

#[test]
fn summary_omits_file_path() {
    let value = serde_json::to_value(ProjectSummary::from(&row(Path::new("/secret/path"), None))).unwrap();
    assert!(value.get("file_path_root").is_none());
    assert_eq!(value["doctor_display_name"], "Dr Ivanova");
}

// =============================================================================
// Live database (opt-in)
// =============================================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::TEST_DATABASE_URL;

    #[tokio::test]
    async fn save_then_load_round_trips_scene_state() {
        let pool = crate::db::init_pool(TEST_DATABASE_URL, 1).await.unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO projects (patient_name, file_path_root) VALUES ('Live', $1) RETURNING id",
        )
        .bind(tmp.path().to_string_lossy().into_owned())
        .fetch_one(&pool)
        .await
        .unwrap();

        let model = ModelConfig::with_defaults(&MeshFile { id: "stl-0".into(), name: "a.stl".into(), url: "u".into() });
        save_scene_state(&pool, id, std::slice::from_ref(&model)).await.unwrap();

        let row = get_project(&pool, id).await.unwrap();
        let normalized = normalize_scene_state(&row.scene_state.unwrap()).unwrap();
        assert_eq!(normalized[0]["id"], "stl-0");
    }

    #[tokio::test]
    async fn save_unknown_project_is_not_found() {
        let pool = crate::db::init_pool(TEST_DATABASE_URL, 1).await.unwrap();
        let err = save_scene_state(&pool, Uuid::new_v4(), &[]).await.unwrap_err();
        assert!(matches!(err, ProjectError::NotFound(_)));
    }
}
