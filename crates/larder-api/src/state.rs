use std::sync::Arc;

use larder_db::Database;
use larder_gateway::Gateway;

use crate::uploads::UploadSigner;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub gateway: Gateway,
    /// `None` when upload credentials are not configured.
    pub uploads: Option<UploadSigner>,
}

impl AppStateInner {
    pub fn db(&self) -> Arc<Database> {
        self.gateway.db().clone()
    }
}
