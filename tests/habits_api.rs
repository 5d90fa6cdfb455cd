mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn create_and_get_habit_round_trip() {
    let app = test_app();

    let (status, headers, body) =
        send(&app, json_request("POST", "/habits", &sample_habit("Read"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let location = headers.get("location").expect("location header");
    let id = body["id"].as_str().expect("id");
    assert!(location.to_str().unwrap().ends_with(&format!("/habits/{}", id)));

    let (status, _, body) = send(&app, get(&format!("/habits/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Read");
    assert_eq!(body["status"], "ongoing");
    assert_eq!(body["isArchived"], false);
}

#[tokio::test]
async fn shaping_projects_requested_fields_in_requested_order() {
    let app = test_app();
    create_habit(&app, "Read").await;

    let (status, _, body) = send(&app, get("/habits?fields=name,status")).await;
    assert_eq!(status, StatusCode::OK);

    let item = body["items"][0].as_object().expect("shaped item");
    let keys: Vec<&str> = item.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["name", "status"]);
}

#[tokio::test]
async fn unknown_shape_field_is_rejected_naming_the_field() {
    let app = test_app();

    let (status, _, body) = send(&app, get("/habits?fields=name,bogus")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("'bogus'"));
}

#[tokio::test]
async fn sort_descending_created_then_name() {
    let app = test_app();
    create_habit(&app, "alpha").await;
    create_habit(&app, "beta").await;
    create_habit(&app, "gamma").await;

    let (status, _, body) = send(&app, get("/habits?sort=-createdAtUtc,name")).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["gamma", "beta", "alpha"]);
}

#[tokio::test]
async fn invalid_sort_field_is_rejected_naming_the_field() {
    let app = test_app();

    let (status, _, body) = send(&app, get("/habits?sort=price")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("'price'"));
}

#[tokio::test]
async fn hateoas_accept_toggles_links() {
    let app = test_app();
    create_habit(&app, "Read").await;

    let (status, headers, body) =
        send(&app, get_with_accept("/habits", "application/vnd.habit-api.hateoas.v1+json")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get("content-type").unwrap(),
        "application/vnd.habit-api.hateoas.v1+json"
    );
    assert!(body["links"].is_array());
    assert!(body["items"][0]["links"].is_array());

    let (status, _, body) = send(&app, get_with_accept("/habits", "application/json")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("links").is_none());
    assert!(body["items"][0].get("links").is_none());
}

#[tokio::test]
async fn unsupported_accept_is_not_acceptable() {
    let app = test_app();

    let (status, _, body) = send(&app, get_with_accept("/habits", "application/xml")).await;
    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["status"], 406);
}

#[tokio::test]
async fn v2_media_type_renames_timestamp_fields() {
    let app = test_app();
    let id = create_habit(&app, "Read").await;

    let (status, _, body) = send(
        &app,
        get_with_accept(&format!("/habits/{}", id), "application/vnd.habit-api.v2+json"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("createdAt").is_some());
    assert!(body.get("createdAtUtc").is_none());
}

#[tokio::test]
async fn validation_errors_name_the_offending_fields() {
    let app = test_app();

    let mut habit = sample_habit("  ");
    habit["target"]["value"] = json!(0);
    let (status, _, body) = send(&app, json_request("POST", "/habits", &habit)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"]["name"].is_string());
    assert!(body["errors"]["target.value"].is_string());
}

#[tokio::test]
async fn upsert_habit_tags_validates_and_replaces() {
    let app = test_app();
    let habit_id = create_habit(&app, "Read").await;

    let (status, _, tag) =
        send(&app, json_request("POST", "/tags", &json!({ "name": "health" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let tag_id = tag["id"].as_str().unwrap().to_string();

    let (status, _, _) = send(
        &app,
        json_request(
            "PUT",
            &format!("/habits/{}/tags", habit_id),
            &json!({ "tagIds": [tag_id] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) = send(&app, get(&format!("/habits/{}", habit_id))).await;
    assert_eq!(body["tags"], json!(["health"]));

    // Unknown tag id rejects the whole set
    let (status, _, body) = send(
        &app,
        json_request(
            "PUT",
            &format!("/habits/{}/tags", habit_id),
            &json!({ "tagIds": ["t_missing"] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("tag"));

    let (status, _, _) = send(
        &app,
        empty_request("DELETE", &format!("/habits/{}/tags/{}", habit_id, tag_id)),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn duplicate_tag_names_conflict() {
    let app = test_app();

    let (status, _, _) =
        send(&app, json_request("POST", "/tags", &json!({ "name": "health" }))).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) =
        send(&app, json_request("POST", "/tags", &json!({ "name": "Health" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn archiving_flips_hypermedia_affordances() {
    let app = test_app();
    let id = create_habit(&app, "Read").await;

    let rels = |body: &serde_json::Value| -> Vec<String> {
        body["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["rel"].as_str().unwrap().to_string())
            .collect()
    };

    let uri = format!("/habits/{}", id);
    let (_, _, body) =
        send(&app, get_with_accept(&uri, "application/vnd.habit-api.hateoas.v1+json")).await;
    assert!(rels(&body).contains(&"archive".to_string()));
    assert!(!rels(&body).contains(&"un-archive".to_string()));

    let (status, _, _) = send(&app, empty_request("PUT", &format!("{}/archive", uri))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    // Archiving twice stays a no-op 204
    let (status, _, _) = send(&app, empty_request("PUT", &format!("{}/archive", uri))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) =
        send(&app, get_with_accept(&uri, "application/vnd.habit-api.hateoas.v1+json")).await;
    assert!(rels(&body).contains(&"un-archive".to_string()));
    assert!(!rels(&body).contains(&"archive".to_string()));
}

#[tokio::test]
async fn entries_require_an_existing_habit() {
    let app = test_app();

    let entry = json!({ "habitId": "h_missing", "value": 1, "date": "2026-08-01" });
    let (status, _, _) = send(&app, json_request("POST", "/entries", &entry)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn entry_batch_creates_all_or_nothing() {
    let app = test_app();
    let habit_id = create_habit(&app, "Read").await;

    // One bad entry poisons the whole batch
    let batch = json!([
        { "habitId": habit_id, "value": 1, "date": "2026-08-01" },
        { "habitId": "h_missing", "value": 1, "date": "2026-08-02" },
    ]);
    let (status, _, _) = send(&app, json_request("POST", "/entries/batch", &batch)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, _, body) = send(&app, get("/entries")).await;
    assert_eq!(body["totalCount"], 0);

    let batch = json!([
        { "habitId": habit_id, "value": 1, "date": "2026-08-01" },
        { "habitId": habit_id, "value": 2, "date": "2026-08-02" },
    ]);
    let (status, _, body) = send(&app, json_request("POST", "/entries/batch", &batch)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_a_habit_cascades_to_its_entries() {
    let app = test_app();
    let habit_id = create_habit(&app, "Read").await;

    let entry = json!({ "habitId": habit_id, "value": 1, "date": "2026-08-01" });
    let (status, _, _) = send(&app, json_request("POST", "/entries", &entry)).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _, _) = send(&app, empty_request("DELETE", &format!("/habits/{}", habit_id))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, _, body) = send(&app, get("/entries")).await;
    assert_eq!(body["totalCount"], 0);
}

#[tokio::test]
async fn pagination_metadata_is_reported() {
    let app = test_app();
    for i in 0..3 {
        create_habit(&app, &format!("habit-{}", i)).await;
    }

    let (status, _, body) = send(&app, get("/habits?page=1&page_size=2")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["totalCount"], 3);
    assert_eq!(body["totalPages"], 2);
    assert_eq!(body["hasNextPage"], true);
    assert_eq!(body["hasPreviousPage"], false);
}
