use std::sync::Arc;

use crate::services::forecast_service::SubmissionPolicy;
use crate::store::ForecastStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ForecastStore>,
    pub submission_policy: SubmissionPolicy,
}
