// Application state for HTTP handlers
use crate::application::auth_service::AuthService;
use crate::application::chart_service::ChartService;
use crate::application::layout_service::TileLayoutManager;
use crate::application::sensor_service::SensorService;
use crate::application::session_store::SessionStore;
use tokio::sync::Mutex;

pub struct AppState {
    pub session: SessionStore,
    pub auth_service: AuthService,
    pub sensor_service: SensorService,
    pub chart_service: ChartService,
    /// Single writer: only user actions mutate the layout
    pub layout: Mutex<TileLayoutManager>,
}
