//! Application State
//!
//! Shared state across all handlers. The catalog and the agent pipelines
//! are built once at startup; configuration-absent features degrade here
//! (canned-only chat, skipped email, in-memory stores) instead of failing
//! requests later.

use std::sync::Arc;

use parking_lot::RwLock;

use lead_desk_agent::{LeadIntake, SalesAgent};
use lead_desk_config::{Catalog, Settings};
use lead_desk_llm::{ChatBackend, CohereBackend, CohereConfig};
use lead_desk_notify::{Mailer, NoopMailer, SmtpMailer};
use lead_desk_persistence::{ChatLogStore, InMemoryChatLog, InMemoryLeadStore, LeadStore};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    pub catalog: Arc<Catalog>,
    pub agent: Arc<SalesAgent>,
    pub intake: Arc<LeadIntake>,
    pub leads: Arc<dyn LeadStore>,
    pub chats: Arc<dyn ChatLogStore>,
}

impl AppState {
    /// Create application state with in-memory stores.
    pub fn new(config: Settings) -> Self {
        Self::with_stores(
            config,
            Arc::new(InMemoryLeadStore::new()),
            Arc::new(InMemoryChatLog::new()),
        )
    }

    /// Create application state with the given stores (ScyllaDB in
    /// production, in-memory otherwise).
    pub fn with_stores(
        config: Settings,
        leads: Arc<dyn LeadStore>,
        chats: Arc<dyn ChatLogStore>,
    ) -> Self {
        let catalog = load_catalog(&config);
        let backend = build_backend(&config);
        let mailer = build_mailer(&config);

        let agent = Arc::new(SalesAgent::new(catalog.clone(), backend.clone()));
        let intake = Arc::new(LeadIntake::new(
            catalog.clone(),
            leads.clone(),
            mailer,
            backend,
        ));

        Self {
            config: Arc::new(RwLock::new(config)),
            catalog,
            agent,
            intake,
            leads,
            chats,
        }
    }

    /// Get a read guard to the current configuration
    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }
}

fn load_catalog(config: &Settings) -> Arc<Catalog> {
    match &config.catalog_path {
        Some(path) => match Catalog::load(path) {
            Ok(catalog) => Arc::new(catalog),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load catalog override, using built-in");
                Arc::new(Catalog::default())
            }
        },
        None => Arc::new(Catalog::default()),
    }
}

fn build_backend(config: &Settings) -> Option<Arc<dyn ChatBackend>> {
    let cohere_config = CohereConfig::from_settings(&config.llm)?;
    match CohereBackend::new(cohere_config) {
        Ok(backend) => {
            tracing::info!(model = backend.model_id(), "Chat model configured");
            Some(Arc::new(backend))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Chat model unavailable, canned replies only");
            None
        }
    }
}

fn build_mailer(config: &Settings) -> Arc<dyn Mailer> {
    match SmtpMailer::from_settings(&config.smtp) {
        Ok(Some(mailer)) => Arc::new(mailer),
        Ok(None) => {
            tracing::info!("SMTP not configured, lead emails will be skipped");
            Arc::new(NoopMailer)
        }
        Err(e) => {
            tracing::warn!(error = %e, "SMTP configuration invalid, lead emails will be skipped");
            Arc::new(NoopMailer)
        }
    }
}
