use crate::data::{SolveOutcome, TimetableInput};
use crate::error::ConfigurationError;
use crate::solver;
use axum::{Json, Router, body::Bytes, http::StatusCode, routing::post};
use log::{error, info};

// malformed bodies are configuration errors, same as on the CLI
async fn solve_handler(body: Bytes) -> Result<Json<SolveOutcome>, (StatusCode, String)> {
    let input: TimetableInput = serde_json::from_slice(&body)
        .map_err(|e| (StatusCode::BAD_REQUEST, ConfigurationError::from(e).to_string()))?;

    // HiGHS blocks for the whole solve
    let result = tokio::task::spawn_blocking(move || solver::solve(&input)).await;
    match result {
        Ok(Ok(outcome)) => Ok(Json(outcome)),
        Ok(Err(e)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => {
            error!("Solve task failed: {}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "solve task failed".to_string()))
        }
    }
}

pub fn app() -> Router {
    Router::new().route("/v1/timetable/solve", post(solve_handler))
}

pub async fn run_server(addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, app()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post_json(body: &str) -> (StatusCode, Vec<u8>) {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/timetable/solve")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_solve_returns_feasible_timetable() {
        let (status, body) = post_json(
            r#"{"numDays": 5, "numHours": 6, "groups": [{"id": "A"}],
                "subjects": [{"name": "Maths", "weeklyHours": 5, "maxHoursPerDay": 2}],
                "teachers": [{"name": "John", "maxHoursWeek": 5, "subjects": ["Maths"]}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "FEASIBLE");
        assert_eq!(json["lessons"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_solve_reports_infeasible_as_ok() {
        let (status, body) = post_json(
            r#"{"numDays": 5, "numHours": 6, "groups": [{"id": "A"}],
                "subjects": [{"name": "Maths", "weeklyHours": 5, "maxHoursPerDay": 2}],
                "teachers": [{"name": "John", "maxHoursWeek": 3, "subjects": ["Maths"]}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "INFEASIBLE");
    }

    #[tokio::test]
    async fn test_negative_hours_are_bad_request() {
        let (status, body) = post_json(
            r#"{"numDays": 5, "numHours": 6, "groups": [{"id": "A"}],
                "subjects": [{"name": "Maths", "weeklyHours": -5}],
                "teachers": []}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().starts_with("cannot parse input: "));
    }

    #[tokio::test]
    async fn test_malformed_body_is_bad_request() {
        let (status, body) = post_json("{\"numDays\": 5,").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().starts_with("cannot parse input: "));
    }

    #[tokio::test]
    async fn test_negative_seed_is_bad_request() {
        let (status, body) = post_json(
            r#"{"numDays": 5, "numHours": 6, "groups": [{"id": "A"}],
                "subjects": [{"name": "Maths"}],
                "teachers": [{"name": "John", "subjects": ["Maths"]}],
                "solver": {"randomSeed": -1}}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "solver.randomSeed must not be negative, got -1"
        );
    }

    #[tokio::test]
    async fn test_configuration_error_is_bad_request() {
        let (status, body) = post_json(
            r#"{"numDays": 5, "numHours": 6, "groups": [{"id": "A"}],
                "subjects": [],
                "teachers": [{"name": "John", "subjects": ["Maths"]}]}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "teacher 'John' references undeclared subject 'Maths'"
        );
    }
}
