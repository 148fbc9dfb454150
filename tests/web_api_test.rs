//! End-to-end tests of the JSON API over an in-memory store.

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;
use tradejournal::domain::entry::{NewEntry, Outcome};
use tradejournal::ports::journal_port::JournalPort;

use common::*;

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn api_routes_require_a_token() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/journal")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["status_code"], 401);
        assert_eq!(body["message"], "Missing Authorization header");
    }

    #[tokio::test]
    async fn unknown_token_is_rejected() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/dashboard")
                    .header("authorization", "Bearer not-the-token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Unauthorized user");
    }

    #[tokio::test]
    async fn unknown_route_gets_the_json_envelope() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/definitely/not/here")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "Endpoint not found");
    }
}

mod journal_tests {
    use super::*;

    #[tokio::test]
    async fn create_entry_returns_the_stored_row() {
        let app = test_app();

        let body = multipart_body(
            &[
                ("date", "2024-03-01"),
                ("instrument", "EURUSD"),
                ("side", "Buy"),
                ("capital", "1000"),
                ("profit", "150.5"),
                ("outcome", "WIN"),
            ],
            &[],
        );
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("POST", "/api/journal", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["status"], true);
        assert_eq!(body["message"], "Journal added successfully");
        assert_eq!(body["data"]["instrument"], "EURUSD");
        assert_eq!(body["data"]["side"], "Long");
        assert_eq!(body["data"]["outcome"], "Win");
        assert_eq!(body["data"]["profit"], 150.5);
        assert!(body["data"]["id"].as_i64().unwrap() > 0);
    }

    #[tokio::test]
    async fn create_entry_requires_a_date() {
        let app = test_app();

        let body = multipart_body(&[("instrument", "EURUSD")], &[]);
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("POST", "/api/journal", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["status"], false);
        assert_eq!(body["message"], "date is required");
    }

    #[tokio::test]
    async fn create_normalizes_cent_account_amounts() {
        let app = test_app();

        let body = multipart_body(
            &[
                ("date", "2024-03-01"),
                ("capital", "50000"),
                ("profit", "-2500"),
                ("capital_unit", "Cent"),
            ],
            &[],
        );
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("POST", "/api/journal", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;
        assert_eq!(body["data"]["capital"], 500.0);
        assert_eq!(body["data"]["profit"], -25.0);
        assert_eq!(body["data"]["capital_unit"], "Minor");
    }

    #[tokio::test]
    async fn list_carries_pagination_metadata() {
        let app = test_app();
        for day in 1..=7 {
            app.store
                .insert(app.owner_id, entry_on(&format!("2024-03-{day:02}")))
                .unwrap();
        }

        let response = app
            .router
            .clone()
            .oneshot(authed_get("/api/journal?page=2&limit=3&sort_order=asc"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Journals fetched successfully");
        assert_eq!(body["page"], 2);
        assert_eq!(body["limit"], 3);
        assert_eq!(body["total"], 7);
        assert_eq!(body["total_pages"], 3);
        assert_eq!(body["data"].as_array().unwrap().len(), 3);
        assert_eq!(body["data"][0]["date"], "2024-03-04");
    }

    #[tokio::test]
    async fn list_filters_by_instrument_and_outcome() {
        let app = test_app();
        app.store
            .insert(
                app.owner_id,
                NewEntry {
                    instrument: Some("EURUSD".into()),
                    outcome: Some(Outcome::Win),
                    ..entry_on("2024-03-01")
                },
            )
            .unwrap();
        app.store
            .insert(
                app.owner_id,
                NewEntry {
                    instrument: Some("GBPJPY".into()),
                    outcome: Some(Outcome::Lose),
                    ..entry_on("2024-03-02")
                },
            )
            .unwrap();

        let response = app
            .router
            .clone()
            .oneshot(authed_get("/api/journal?instrument=EUR&outcome=win"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["data"][0]["instrument"], "EURUSD");
    }

    #[tokio::test]
    async fn list_only_shows_the_callers_rows() {
        let app = test_app();
        let other = app.store.create_user("someone-else", "other-token").unwrap();
        app.store.insert(other.id, entry_on("2024-03-01")).unwrap();

        let response = app
            .router
            .clone()
            .oneshot(authed_get("/api/journal"))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["total"], 0);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_patches_the_row() {
        let app = test_app();
        let row = app
            .store
            .insert(
                app.owner_id,
                NewEntry {
                    instrument: Some("XAUUSD".into()),
                    profit: Some(-10.0),
                    ..entry_on("2024-03-01")
                },
            )
            .unwrap();

        let body = multipart_body(&[("profit", "42"), ("outcome", "win")], &[]);
        let response = app
            .router
            .clone()
            .oneshot(multipart_request(
                "PUT",
                &format!("/api/journal/{}", row.id),
                body,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Journal updated successfully");
        assert_eq!(body["data"]["profit"], 42.0);
        assert_eq!(body["data"]["outcome"], "Win");
        assert_eq!(body["data"]["instrument"], "XAUUSD");
    }

    #[tokio::test]
    async fn update_unknown_row_is_404() {
        let app = test_app();

        let body = multipart_body(&[("profit", "1")], &[]);
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("PUT", "/api/journal/12345", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["status"], false);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let app = test_app();
        let row = app.store.insert(app.owner_id, entry_on("2024-03-01")).unwrap();

        let response = app
            .router
            .clone()
            .oneshot(authed_delete(&format!("/api/journal/{}", row.id)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Journal and files deleted successfully");

        let response = app
            .router
            .clone()
            .oneshot(authed_delete(&format!("/api/journal/{}", row.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

mod image_tests {
    use super::*;

    #[tokio::test]
    async fn uploads_land_on_disk_and_die_with_the_row() {
        let app = test_app();

        let body = multipart_body(
            &[("date", "2024-03-01")],
            &[
                ("before_image", "setup.png", b"before-bytes"),
                ("after_image", "result.png", b"after-bytes"),
            ],
        );
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("POST", "/api/journal", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = json_body(response).await;

        let id = body["data"]["id"].as_i64().unwrap();
        let before_ref = body["data"]["before_image"].as_str().unwrap().to_string();
        let after_ref = body["data"]["after_image"].as_str().unwrap().to_string();
        assert!(before_ref.starts_with("before/"));
        assert!(after_ref.starts_with("after/"));
        assert!(app.uploads.path().join(&before_ref).exists());
        assert!(app.uploads.path().join(&after_ref).exists());

        let response = app
            .router
            .clone()
            .oneshot(authed_delete(&format!("/api/journal/{id}")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!app.uploads.path().join(&before_ref).exists());
        assert!(!app.uploads.path().join(&after_ref).exists());
    }

    #[tokio::test]
    async fn replacement_upload_removes_the_superseded_file() {
        let app = test_app();

        let body = multipart_body(
            &[("date", "2024-03-01")],
            &[("before_image", "v1.png", b"v1")],
        );
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("POST", "/api/journal", body))
            .await
            .unwrap();
        let created = json_body(response).await;
        let id = created["data"]["id"].as_i64().unwrap();
        let old_ref = created["data"]["before_image"].as_str().unwrap().to_string();

        let body = multipart_body(&[], &[("before_image", "v2.png", b"v2")]);
        let response = app
            .router
            .clone()
            .oneshot(multipart_request(
                "PUT",
                &format!("/api/journal/{id}"),
                body,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated = json_body(response).await;
        let new_ref = updated["data"]["before_image"].as_str().unwrap().to_string();

        assert_ne!(old_ref, new_ref);
        assert!(!app.uploads.path().join(&old_ref).exists());
        assert!(app.uploads.path().join(&new_ref).exists());
    }

    #[tokio::test]
    async fn stored_images_are_served_under_uploads() {
        let app = test_app();

        let body = multipart_body(
            &[("date", "2024-03-01")],
            &[("before_image", "chart.png", b"png-payload")],
        );
        let response = app
            .router
            .clone()
            .oneshot(multipart_request("POST", "/api/journal", body))
            .await
            .unwrap();
        let created = json_body(response).await;
        let reference = created["data"]["before_image"].as_str().unwrap();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/uploads/{reference}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

mod dashboard_tests {
    use super::*;

    #[tokio::test]
    async fn empty_journal_gets_the_zero_summary() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(authed_get("/api/dashboard"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "No data available for dashboard");
        assert_eq!(body["data"]["equity"], 0.0);
        assert_eq!(body["data"]["total_pnl"], 0.0);
        assert_eq!(body["data"]["win_rate"], 0.0);
        assert!(body["data"]["daily"].as_array().unwrap().is_empty());
        assert!(body["data"]["weekly"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn summary_reflects_capital_resets_and_outcomes() {
        let app = test_app();
        app.store
            .insert(
                app.owner_id,
                NewEntry {
                    capital: Some(1000.0),
                    ..entry_on("2024-01-01")
                },
            )
            .unwrap();
        app.store
            .insert(
                app.owner_id,
                NewEntry {
                    profit: Some(100.0),
                    outcome: Some(Outcome::Win),
                    ..entry_on("2024-01-02")
                },
            )
            .unwrap();
        app.store
            .insert(
                app.owner_id,
                NewEntry {
                    capital: Some(500.0),
                    ..entry_on("2024-01-03")
                },
            )
            .unwrap();
        app.store
            .insert(
                app.owner_id,
                NewEntry {
                    profit: Some(-50.0),
                    outcome: Some(Outcome::Lose),
                    ..entry_on("2024-01-04")
                },
            )
            .unwrap();

        let response = app
            .router
            .clone()
            .oneshot(authed_get("/api/dashboard"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Dashboard data calculated successfully");
        assert_eq!(body["data"]["equity"], 450.0);
        assert_eq!(body["data"]["total_pnl"], 50.0);
        assert_eq!(body["data"]["total_trades"], 4);
        assert_eq!(body["data"]["win_rate"], 25.0);
        assert_eq!(body["data"]["max_drawdown_pct"], 10.0);
    }
}

mod pairs_tests {
    use super::*;

    #[tokio::test]
    async fn pairs_endpoint_returns_the_catalog() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(authed_get("/api/pairs?type=forex"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["message"], "Pairs fetched successfully");
        assert_eq!(body["data"]["type"], "forex");
        assert_eq!(body["data"]["pairs"][0], "EURUSD");
    }

    #[tokio::test]
    async fn pairs_endpoint_requires_auth() {
        let app = test_app();

        let response = app
            .router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/pairs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
