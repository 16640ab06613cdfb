use std::sync::Arc;

use sqlx::SqlitePool;

use crate::attendance::GridWindow;
use crate::models::CourseCatalog;
use crate::storage::ObjectStore;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub storage: Arc<dyn ObjectStore>,
    pub catalog: Arc<CourseCatalog>,
    pub grid_window: GridWindow,
}
