use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use wellbeing_engine::validation::validate_ranges;
use wellbeing_engine::Engine;

use crate::api::{
    ApiError, ApiFeaturesResponse, ApiHealthResponse, ApiModelsResponse, ApiPersonasResponse,
    ApiPredictionResponse,
};

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

pub async fn serve(args: crate::ServeArgs, engine: Engine) -> Result<(), String> {
    let app = router(Arc::new(engine));

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| format!("failed to bind server: {}", err))?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/predict", post(predict_handler))
        .route("/api/features", get(features_handler))
        .route("/api/personas", get(personas_handler))
        .route("/api/models", get(models_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

async fn health() -> Json<ApiHealthResponse> {
    Json(ApiHealthResponse {
        status: "healthy".to_string(),
        message: "All systems operational".to_string(),
    })
}

async fn predict_handler(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<ApiPredictionResponse> {
    let record = match body {
        Value::Object(record) => record,
        _ => return Err(bad_request("request body must be a JSON object")),
    };
    validate_ranges(&record).map_err(|err| bad_request(err.to_string()))?;

    let prediction = state.engine.infer(&record).map_err(|err| {
        error!(error = %err, "prediction failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiError::new(format!("Prediction failed: {}", err))),
        )
    })?;

    Ok(Json(ApiPredictionResponse::from_prediction(prediction)))
}

async fn features_handler(State(state): State<AppState>) -> Json<ApiFeaturesResponse> {
    Json(ApiFeaturesResponse::from_models(state.engine.models()))
}

async fn personas_handler(State(state): State<AppState>) -> Json<ApiPersonasResponse> {
    Json(ApiPersonasResponse::from_models(state.engine.models()))
}

async fn models_handler(State(state): State<AppState>) -> Json<ApiModelsResponse> {
    Json(ApiModelsResponse::from_models(state.engine.models()))
}

fn bad_request(detail: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (StatusCode::BAD_REQUEST, Json(ApiError::new(detail)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::json;
    use tower::ServiceExt;
    use wellbeing_engine::models::{ClusterModel, Regressor};
    use wellbeing_engine::{
        EngineConfig, FeatureVector, ModelContext, ModelError, PersonaLabelMap, PersonaModel,
        UsageMetrics,
    };

    struct Constant(f64);

    impl Regressor for Constant {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Regressor for Failing {
        fn predict(&self, _features: &FeatureVector) -> Result<f64, ModelError> {
            Err(ModelError::NonFinite)
        }
    }

    struct FixedCluster(usize);

    impl ClusterModel for FixedCluster {
        fn predict(&self, _usage: &UsageMetrics) -> Result<usize, ModelError> {
            Ok(self.0)
        }
    }

    fn app(stress: Box<dyn Regressor>) -> Router {
        let models = ModelContext::new(
            Box::new(Constant(7.5)),
            stress,
            PersonaModel::Ready(Box::new(FixedCluster(1))),
            PersonaLabelMap::from([(0, "Doom-Scroller"), (1, "Light User"), (2, "Moderate User")]),
        );
        router(Arc::new(Engine::new(&EngineConfig::default(), models)))
    }

    fn light_user() -> Value {
        json!({
            "age": 28,
            "sleep_hours_per_night": 8,
            "exercise_hours_per_week": 5,
            "social_events_per_month": 6,
            "body_mass_index": 22.0,
            "daily_active_minutes_instagram": 10,
            "sessions_per_day": 2,
            "reels_watched_per_day": 5,
            "stories_viewed_per_day": 3,
            "likes_given_per_day": 4,
            "comments_written_per_day": 1,
            "notification_response_rate": 0.1,
        })
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let (status, body) = send(app(Box::new(Constant(2.0))), get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn predict_returns_scores_and_persona() {
        let (status, body) = send(
            app(Box::new(Constant(2.0))),
            post_json("/api/predict", &light_user()),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["happiness_score"], 7.5);
        assert_eq!(body["stress_score"], 2.0);
        assert_eq!(body["persona"], "Light User");
        let recommendations = body["recommendations"].as_array().expect("array");
        assert!(!recommendations.is_empty() && recommendations.len() <= 6);
    }

    #[tokio::test]
    async fn predict_rejects_out_of_range_input() {
        let mut record = light_user();
        record["age"] = json!(5);
        let (status, body) = send(
            app(Box::new(Constant(2.0))),
            post_json("/api/predict", &record),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Age must be between 13 and 100");
    }

    #[tokio::test]
    async fn predict_rejects_non_object_body() {
        let (status, _) = send(
            app(Box::new(Constant(2.0))),
            post_json("/api/predict", &json!([1, 2, 3])),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn model_failure_is_internal_error() {
        let (status, body) = send(
            app(Box::new(Failing)),
            post_json("/api/predict", &light_user()),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().expect("detail");
        assert!(detail.starts_with("Prediction failed"), "{}", detail);
        assert!(detail.contains("stress"), "{}", detail);
    }

    #[tokio::test]
    async fn metadata_routes_describe_the_bundle() {
        let (_, features) = send(app(Box::new(Constant(2.0))), get_request("/api/features")).await;
        assert_eq!(features["total_features"], 28);

        let (_, personas) = send(app(Box::new(Constant(2.0))), get_request("/api/personas")).await;
        assert_eq!(
            personas["personas"],
            json!(["Doom-Scroller", "Light User", "Moderate User"])
        );
        assert_eq!(personas["persona_mapping"]["1"], "Light User");

        let (_, models) = send(app(Box::new(Constant(2.0))), get_request("/api/models")).await;
        assert_eq!(models["persona_model"], "ready");
        assert_eq!(models["label_count"], 3);
    }
}
