use std::sync::Arc;

use crate::cache::CacheStore;
use crate::service::TrackerService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TrackerService>,
    pub cache: Arc<CacheStore>,
}
