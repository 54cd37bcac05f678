// Router assembly
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    add_tile, chart_series, dashboard, health_check, list_tiles, login, login_page, logout, overview,
    register, register_page, remove_tile, reorder_tiles, require_session, reset_password, set_tile_kind,
    tile_content, update_tile_settings,
};
use axum::{
    Router, middleware,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    // Everything below needs a signed-in user
    let gated = Router::new()
        .route("/tiles", get(list_tiles).post(add_tile))
        .route("/tiles/reorder", post(reorder_tiles))
        .route("/tiles/:id", delete(remove_tile))
        .route("/tiles/:id/settings", patch(update_tile_settings))
        .route("/tiles/:id/kind", put(set_tile_kind))
        .route("/tiles/:id/content", get(tile_content))
        .route("/api/overview", get(overview))
        .route("/api/charts/:sensor", get(chart_series))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(health_check))
        .route("/login", get(login_page).post(login))
        .route("/login/reset", post(reset_password))
        .route("/register", get(register_page).post(register))
        .route("/logout", post(logout))
        .merge(gated)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::auth_service::AuthService;
    use crate::application::chart_service::ChartService;
    use crate::application::identity_provider::fake::FakeIdentityProvider;
    use crate::application::layout_service::TileLayoutManager;
    use crate::application::layout_storage::MemoryLayoutStorage;
    use crate::application::sensor_repository::fake::FakeSensorRepository;
    use crate::application::sensor_service::SensorService;
    use crate::application::session_store::SessionStore;
    use crate::domain::chart::ChartRange;
    use crate::domain::sensor::{Reading, SensorKind, SensorRecord};
    use crate::domain::session::User;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    struct Harness {
        base: String,
        client: reqwest::Client,
        state: Arc<AppState>,
        provider: Arc<FakeIdentityProvider>,
    }

    impl Harness {
        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base, path)
        }

        fn sign_in_directly(&self) {
            self.state.session.set_user(Some(User {
                uid: "uid-keeper".into(),
                email: "keeper@example.com".into(),
            }));
        }
    }

    fn record(id: &str, at: &str, value: f64) -> SensorRecord {
        SensorRecord::new(id.into(), DateTime::parse_from_rfc3339(at).unwrap(), Reading::Value(value))
    }

    async fn spawn(repository: FakeSensorRepository) -> Harness {
        let provider = Arc::new(FakeIdentityProvider::new().with_account("keeper@example.com", "secret1"));
        let repository = Arc::new(repository);
        let state = Arc::new(AppState {
            session: SessionStore::new(),
            auth_service: AuthService::new(provider.clone()),
            sensor_service: SensorService::new(repository.clone()),
            chart_service: ChartService::new(repository)
                .with_clock(|| Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()),
            layout: Mutex::new(TileLayoutManager::open(Arc::new(MemoryLayoutStorage::default()))),
        });

        let router = build_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();
        Harness {
            base: format!("http://{}", addr),
            client,
            state,
            provider,
        }
    }

    #[tokio::test]
    async fn test_dashboard_shows_loading_until_session_resolves() {
        let h = spawn(FakeSensorRepository::default()).await;

        let response = h.client.get(h.url("/")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.text().await.unwrap().contains("Loading..."));

        h.state.session.set_user(None);
        let response = h.client.get(h.url("/")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 303);
        assert_eq!(response.headers()["location"], "/login");
    }

    #[tokio::test]
    async fn test_tile_api_requires_a_user() {
        let h = spawn(FakeSensorRepository::default()).await;
        h.state.session.set_user(None);

        let response = h.client.get(h.url("/tiles")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 401);
        let response = h.client.post(h.url("/tiles")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 401);
        assert_eq!(h.state.layout.lock().await.tiles().len(), 4);
    }

    #[tokio::test]
    async fn test_wrong_password_stays_on_login() {
        let h = spawn(FakeSensorRepository::default()).await;
        h.state.session.set_user(None);

        let response = h
            .client
            .post(h.url("/login"))
            .form(&[("email", "keeper@example.com"), ("password", "wrong")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.text().await.unwrap().contains("Invalid email or password"));
        assert!(h.state.session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_login_then_logout() {
        let h = spawn(FakeSensorRepository::default()).await;
        h.state.session.set_user(None);

        let response = h
            .client
            .post(h.url("/login"))
            .form(&[("email", "keeper@example.com"), ("password", "secret1")])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 303);
        assert_eq!(response.headers()["location"], "/");
        assert_eq!(
            h.state.session.current_user().map(|u| u.email),
            Some("keeper@example.com".to_string())
        );

        let page = h.client.get(h.url("/")).send().await.unwrap().text().await.unwrap();
        assert!(page.contains("keeper@example.com"));
        assert!(page.contains("data-tile-id=\"overview\""));

        let response = h.client.post(h.url("/logout")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 303);
        assert_eq!(response.headers()["location"], "/login");
        assert!(h.state.session.current_user().is_none());
    }

    #[tokio::test]
    async fn test_short_password_never_reaches_provider() {
        let h = spawn(FakeSensorRepository::default()).await;

        let response = h
            .client
            .post(h.url("/register"))
            .form(&[
                ("email", "new@example.com"),
                ("password", "abcde"),
                ("confirm_password", "abcde"),
            ])
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(
            response
                .text()
                .await
                .unwrap()
                .contains("Password must be at least 6 characters")
        );
        assert_eq!(h.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_reset_without_email() {
        let h = spawn(FakeSensorRepository::default()).await;

        let body = h
            .client
            .post(h.url("/login/reset"))
            .form(&[("email", ""), ("password", "")])
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("Enter your email first"));
        assert_eq!(h.provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_tile_lifecycle() {
        let h = spawn(FakeSensorRepository::default()).await;
        h.sign_in_directly();

        let response = h.client.post(h.url("/tiles")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 201);
        let added: Value = response.json().await.unwrap();
        let id = added["id"].as_str().unwrap().to_string();
        assert_eq!(id.len(), 7);
        assert_eq!(added["kind"], json!({"type": "empty"}));

        let tiles: Value = h
            .client
            .post(h.url("/tiles/reorder"))
            .json(&json!({"source": id, "target": "overview"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(tiles.as_array().unwrap().len(), 5);
        assert_eq!(tiles[0]["id"], id.as_str());
        assert_eq!(tiles[1]["id"], "overview");

        let tile: Value = h
            .client
            .put(h.url(&format!("/tiles/{}/kind", id)))
            .json(&json!({"type": "chart", "sensor": "humidity"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(tile["kind"], json!({"type": "chart", "sensor": "humidity"}));

        let tile: Value = h
            .client
            .patch(h.url(&format!("/tiles/{}/settings", id)))
            .json(&json!({"range": "7d"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(tile["settings"]["range"], "7d");

        let response = h.client.delete(h.url(&format!("/tiles/{}", id))).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 204);
        let response = h.client.delete(h.url(&format!("/tiles/{}", id))).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
        assert_eq!(h.state.layout.lock().await.tiles().len(), 4);
    }

    #[tokio::test]
    async fn test_chart_content_range_override_and_saved_range() {
        let repository = FakeSensorRepository::default().with(
            SensorKind::Temperature,
            vec![record("t1", "2026-10-17T10:00:00Z", 23.5)],
        );
        let h = spawn(repository).await;
        h.sign_in_directly();

        let response = h.client.get(h.url("/tiles/2/content?range=3d")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert!(response.text().await.unwrap().contains("<svg"));
        assert_eq!(h.state.chart_service.state("2").range(), Some(ChartRange::ThreeDays));
        {
            let layout = h.state.layout.lock().await;
            assert_eq!(layout.get("2").unwrap().chart_range(), ChartRange::OneDay);
        }

        let response = h
            .client
            .patch(h.url("/tiles/2/settings"))
            .json(&json!({"range": "7d"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let response = h.client.get(h.url("/tiles/2/content")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(h.state.chart_service.state("2").range(), Some(ChartRange::SevenDays));

        let response = h.client.get(h.url("/tiles/missing/content")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 404);
    }

    #[tokio::test]
    async fn test_overview_api() {
        let repository = FakeSensorRepository::default().with(
            SensorKind::Temperature,
            vec![
                record("t1", "2026-10-18T10:00:00Z", 23.5),
                record("t2", "2026-10-18T11:00:00Z", 24.5),
            ],
        );
        let h = spawn(repository).await;
        h.sign_in_directly();

        let body: Value = h
            .client
            .get(h.url("/api/overview"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let items = body["items"].as_array().unwrap();
        assert_eq!(items.len(), 5);
        assert_eq!(items[0]["value"], "24.5 °C");
    }

    #[tokio::test]
    async fn test_data_api_failures() {
        let h = spawn(FakeSensorRepository::default().failing(SensorKind::Humidity)).await;
        h.sign_in_directly();

        let response = h.client.get(h.url("/api/overview")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 502);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to load overview");

        let response = h.client.get(h.url("/api/charts/humidity?range=1d")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 502);

        let response = h.client.get(h.url("/api/charts/pressure")).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 404);

        let body: Value = h
            .client
            .get(h.url("/api/charts/water-levels?range=bogus"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["sensor"], "water_level");
        assert_eq!(body["range"], "1d");
    }
}
