use std::num::NonZeroU64;
use std::sync::Arc;

use crate::database::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub page_size: NonZeroU64,
}
