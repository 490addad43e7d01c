use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::router::appointment_routes;
use appointment_cell::BookingService;
use assistant_cell::router::assistant_routes;
use assistant_cell::AssistantService;
use doctor_cell::router::doctor_routes;
use doctor_cell::Roster;

/// Everything the cells need, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<Roster>,
    pub booking: Arc<BookingService>,
    pub assistant: Arc<AssistantService>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic assistant API is running!" }))
        .nest("/doctors", doctor_routes(state.roster))
        .nest("/appointments", appointment_routes(state.booking))
        .nest("/assistant", assistant_routes(state.assistant))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    use appointment_cell::InMemoryLedger;
    use assistant_cell::{Dispatcher, OpenAiChatModel, SessionStore};
    use doctor_cell::RosterService;
    use shared_utils::test_utils::{TestConfig, TestRoster};

    fn create_test_app() -> Router {
        let config = TestConfig::default().to_app_config();
        let roster = Arc::new(RosterService::parse(&TestRoster::json()).unwrap());
        let booking = Arc::new(BookingService::new(roster.clone(), Arc::new(InMemoryLedger::new())));
        let model = OpenAiChatModel::new(&config).unwrap();
        let assistant = Arc::new(AssistantService::new(
            Arc::new(model),
            Dispatcher::new(booking.clone()),
            SessionStore::default(),
        ));

        create_router(AppState { roster, booking, assistant })
    }

    async fn get_status(app: Router, uri: &str) -> StatusCode {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_cells_are_mounted() {
        let app = create_test_app();

        assert_eq!(get_status(app.clone(), "/").await, StatusCode::OK);
        assert_eq!(get_status(app.clone(), "/doctors").await, StatusCode::OK);
        assert_eq!(get_status(app.clone(), "/doctors/summary").await, StatusCode::OK);
        assert_eq!(
            get_status(app.clone(), "/appointments/availability?doctor_name=Dr.%20A&date=17/03/2025").await,
            StatusCode::OK
        );
        assert_eq!(
            get_status(app, "/assistant/sessions/6f1c2a8e-0000-4000-8000-000000000000").await,
            StatusCode::NOT_FOUND
        );
    }
}
