//! Shared application state: the database handle plus one constructed client
//! per external collaborator, injected into the routes that use them.

use db::DBService;
use services::services::{
    ai::AiService,
    edge_functions::EdgeFunctionClient,
    llm::LlmClient,
    payments::PaymentService,
    sessions::SessionService,
    settings::SettingsService,
    whatsapp::WhatsAppService,
};
use tracing::error;

use crate::config::AppConfig;

/// Constructed once per process. Clients whose configuration is absent are
/// `None`; the corresponding routes answer with a configuration error while
/// everything else keeps working.
#[derive(Clone)]
pub struct AppState {
    pub db: DBService,
    pub settings: SettingsService,
    pub sessions: SessionService,
    pub functions: Option<EdgeFunctionClient>,
    pub ai: Option<AiService>,
    pub payments: Option<PaymentService>,
    pub whatsapp: Option<WhatsAppService>,
}

impl AppState {
    pub fn new(config: &AppConfig, db: DBService) -> Self {
        let functions = config.functions_base_url.clone().and_then(|base| {
            EdgeFunctionClient::new(base)
                .inspect_err(|e| error!(error = %e, "failed to build edge function client"))
                .ok()
        });

        let ai = config.llm_api_key.clone().and_then(|key| {
            LlmClient::new(key, config.llm_model.clone())
                .inspect_err(|e| error!(error = %e, "failed to build llm client"))
                .ok()
                .map(AiService::new)
        });

        let payments = match (
            config.payment_base_url.clone(),
            config.payment_server_key.clone(),
        ) {
            (Some(base), Some(key)) => PaymentService::new(base, key, db.pool.clone())
                .inspect_err(|e| error!(error = %e, "failed to build payment service"))
                .ok(),
            _ => None,
        };

        let whatsapp = config.whatsapp_webhook_url.clone().and_then(|url| {
            WhatsAppService::new(url)
                .inspect_err(|e| error!(error = %e, "failed to build whatsapp service"))
                .ok()
        });

        Self {
            settings: SettingsService::new(db.pool.clone()),
            sessions: SessionService::new(db.pool.clone()),
            functions,
            ai,
            payments,
            whatsapp,
            db,
        }
    }
}
