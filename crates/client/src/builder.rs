//! Client builder with dependency injection pattern.

use std::collections::VecDeque;

use anyhow::{Context, Result};
use runtime::{Campaign, CampaignState, EncounterPlan, EventBus, HeroRecord, StaticContent};

use crate::{Client, ClientConfig, Variant};

/// Builder for constructing a [`Client`] with validation.
///
/// Content and hero are required; at least one encounter must be queued.
#[derive(Default)]
pub struct ClientBuilder {
    config: Option<ClientConfig>,
    content: Option<StaticContent>,
    hero: Option<HeroRecord>,
    encounters: Vec<(EncounterPlan, Variant)>,
    bus: Option<EventBus>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults to [`ClientConfig::default`].
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn content(mut self, content: StaticContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn hero(mut self, hero: HeroRecord) -> Self {
        self.hero = Some(hero);
        self
    }

    pub fn encounter(mut self, plan: EncounterPlan, variant: Variant) -> Self {
        self.encounters.push((plan, variant));
        self
    }

    pub fn encounters(mut self, encounters: impl IntoIterator<Item = (EncounterPlan, Variant)>) -> Self {
        self.encounters.extend(encounters);
        self
    }

    /// Publish campaign events on `bus`.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.bus = Some(bus);
        self
    }

    /// # Errors
    ///
    /// Returns an error if content or hero is missing, or no encounter was
    /// queued.
    pub fn build(self) -> Result<Client> {
        let config = self.config.unwrap_or_default();
        let content = self.content.context("Content is required")?;
        let hero = self.hero.context("Hero is required")?;
        if self.encounters.is_empty() {
            anyhow::bail!("At least one encounter is required");
        }

        let mut campaign = Campaign::new(CampaignState::new(hero, config.seed), content);
        if let Some(bus) = self.bus {
            campaign = campaign.with_event_bus(bus);
        }

        Ok(Client {
            config,
            campaign,
            queue: VecDeque::from(self.encounters),
            last_result: None,
        })
    }
}
