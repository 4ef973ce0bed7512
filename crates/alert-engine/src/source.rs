//! Read-only access to records owned by the record store.

use async_trait::async_trait;

use crate::error::AlertError;
use crate::location::Location;
use crate::models::{OutbreakEvent, Subscriber, VaccinationEvent};

/// Trait for reading outbreak, vaccination and subscriber records.
///
/// Implemented by the SQLite store, by CSV datasets and by [`InMemorySource`].
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every outbreak report.
    async fn list_outbreaks(&self) -> Result<Vec<OutbreakEvent>, AlertError>;

    /// Every vaccination campaign.
    async fn list_vaccinations(&self) -> Result<Vec<VaccinationEvent>, AlertError>;

    /// Opted-in subscribers whose home location matches `location`.
    async fn list_subscribers(&self, location: &Location) -> Result<Vec<Subscriber>, AlertError>;
}

/// A record source held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    outbreaks: Vec<OutbreakEvent>,
    vaccinations: Vec<VaccinationEvent>,
    subscribers: Vec<Subscriber>,
}

impl InMemorySource {
    pub fn new(
        outbreaks: Vec<OutbreakEvent>,
        vaccinations: Vec<VaccinationEvent>,
        subscribers: Vec<Subscriber>,
    ) -> Self {
        Self {
            outbreaks,
            vaccinations,
            subscribers,
        }
    }

    pub fn with_outbreak(mut self, outbreak: OutbreakEvent) -> Self {
        self.outbreaks.push(outbreak);
        self
    }

    pub fn with_vaccination(mut self, vaccination: VaccinationEvent) -> Self {
        self.vaccinations.push(vaccination);
        self
    }

    pub fn with_subscriber(mut self, subscriber: Subscriber) -> Self {
        self.subscribers.push(subscriber);
        self
    }
}

#[async_trait]
impl RecordSource for InMemorySource {
    async fn list_outbreaks(&self) -> Result<Vec<OutbreakEvent>, AlertError> {
        Ok(self.outbreaks.clone())
    }

    async fn list_vaccinations(&self) -> Result<Vec<VaccinationEvent>, AlertError> {
        Ok(self.vaccinations.clone())
    }

    async fn list_subscribers(&self, location: &Location) -> Result<Vec<Subscriber>, AlertError> {
        Ok(self
            .subscribers
            .iter()
            .filter(|s| s.notifications_enabled && location.matches(&s.location))
            .cloned()
            .collect())
    }
}
