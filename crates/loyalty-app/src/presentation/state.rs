use std::sync::Arc;

use crate::application::commands::handlers::ExecuteCheckInCommandHandler;
use crate::application::queries::{CheckInHistoryQueryService, UserQueryService};
use loyalty_infrastructure::config::AppConfig;

/// Command handlers container
pub struct CommandHandlers {
    pub execute_check_in: Arc<ExecuteCheckInCommandHandler>,
}

pub struct Queries {
    pub users: Arc<UserQueryService>,
    pub check_in_history: Arc<CheckInHistoryQueryService>,
}

/// Shared by every request; cloning only bumps reference counts
#[derive(Clone)]
pub struct AppState {
    pub queries: Arc<Queries>,
    pub command_handlers: Arc<CommandHandlers>,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        crate::presentation::bootstrap::build_app_state(config).await
    }
}
