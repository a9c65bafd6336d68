use async_trait::async_trait;
use tracing::debug;

use super::feed::WarningFeed;
use crate::Result;
use crate::emergency::AustralianState;
use crate::models::EmergencyWarning;

/// Incidents from a state fire service.
///
/// None of the services publish a feed this client can consume yet, so a
/// fetch always succeeds with no warnings.
pub struct StateFireFeed {
    state: AustralianState,
}

impl StateFireFeed {
    #[must_use]
    pub fn new(state: AustralianState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl WarningFeed for StateFireFeed {
    fn name(&self) -> &str {
        self.state.fire_service_name()
    }

    async fn fetch(&self) -> Result<Vec<EmergencyWarning>> {
        debug!(
            "No incident feed available for {} in {}",
            self.state.fire_service_name(),
            self.state
        );
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fire_feed_is_empty() {
        let feed = StateFireFeed::new(AustralianState::NewSouthWales);
        assert_eq!(feed.name(), "RFS (Rural Fire Service)");
        assert!(feed.fetch().await.unwrap().is_empty());
    }
}
