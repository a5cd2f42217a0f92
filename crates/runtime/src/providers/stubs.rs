use async_trait::async_trait;

use combat_core::{ActorProfile, TurnSummary, Validation, VictorySummary};

use crate::api::{ActionValidator, NarrativeGenerator, ServiceError};

/// Accepts every action with an average score.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubValidator;

#[async_trait]
impl ActionValidator for StubValidator {
    async fn validate(
        &self,
        _actor: &ActorProfile,
        _text: &str,
        _context: &str,
    ) -> Result<Validation, ServiceError> {
        Ok(Validation::fallback())
    }
}

/// Narrates with the plain fallback lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StubNarrator;

#[async_trait]
impl NarrativeGenerator for StubNarrator {
    async fn narrate_turn(&self, summary: &TurnSummary) -> Result<String, ServiceError> {
        Ok(summary.fallback_narrative())
    }

    async fn narrate_victory(&self, summary: &VictorySummary) -> Result<String, ServiceError> {
        Ok(summary.fallback_narrative())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use combat_core::{Fighter, FighterId};

    #[tokio::test]
    async fn stub_validator_returns_safe_default() {
        let actor = ActorProfile::from(&Fighter::player(FighterId(1), "Aria", 20));
        let verdict = StubValidator
            .validate(&actor, "I swing wildly", "Round 1")
            .await
            .unwrap();
        assert_eq!(verdict, Validation::fallback());
    }
}
