//! The stepped onboarding state machine.
//!
//! A monotonically increasing 0–10 score maps to the active step; each step
//! completion advances the score to the floor of the next bracket. The score
//! only ever moves forward through `raise_score`, and the onboarded flag is
//! reconciled against the score on every read.

use serde::{Deserialize, Serialize};

/// Terminal score at which onboarding is complete.
pub const ONBOARDING_COMPLETE_SCORE: u8 = 10;

/// Named onboarding steps in score order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStep {
    Profile,
    Education,
    Experience,
    Targets,
    Assessment,
}

impl OnboardingStep {
    pub const fn label(self) -> &'static str {
        match self {
            OnboardingStep::Profile => "profile",
            OnboardingStep::Education => "education",
            OnboardingStep::Experience => "experience",
            OnboardingStep::Targets => "targets",
            OnboardingStep::Assessment => "assessment",
        }
    }

    /// The step active at a given score.
    pub const fn for_score(score: u8) -> Self {
        match score {
            0..=1 => OnboardingStep::Profile,
            2..=3 => OnboardingStep::Education,
            4..=5 => OnboardingStep::Experience,
            6..=7 => OnboardingStep::Targets,
            _ => OnboardingStep::Assessment,
        }
    }

    /// Score reached when this step completes.
    pub const fn completion_score(self) -> u8 {
        match self {
            OnboardingStep::Profile => 2,
            OnboardingStep::Education => 4,
            OnboardingStep::Experience => 6,
            OnboardingStep::Targets => 8,
            OnboardingStep::Assessment => ONBOARDING_COMPLETE_SCORE,
        }
    }
}

/// Per-candidate onboarding position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OnboardingState {
    pub score: u8,
    pub is_onboarded: bool,
}

impl OnboardingState {
    /// Raise the score to `new_score` if it is higher than the stored one;
    /// the score never regresses through this path. Scores clamp at 10 and
    /// reaching 10 sets the onboarded flag. Returns whether anything changed.
    pub fn raise_score(&mut self, new_score: u8) -> bool {
        let capped = new_score.min(ONBOARDING_COMPLETE_SCORE);
        if capped <= self.score {
            return false;
        }

        self.score = capped;
        if self.score >= ONBOARDING_COMPLETE_SCORE {
            self.is_onboarded = true;
        }
        true
    }

    /// Self-healing read-time invariant: the onboarded flag must never be
    /// set while the score is below 10. Returns whether a repair happened.
    pub fn reconcile(&mut self) -> bool {
        if self.is_onboarded && self.score < ONBOARDING_COMPLETE_SCORE {
            self.is_onboarded = false;
            return true;
        }
        false
    }

    pub fn active_step(&self) -> OnboardingStep {
        OnboardingStep::for_score(self.score)
    }

    pub fn is_complete(&self) -> bool {
        self.score >= ONBOARDING_COMPLETE_SCORE
    }
}
