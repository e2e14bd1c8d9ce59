//! Wizard steps, modes and the progress indicator.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One screen of the credential-collection wizard.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum StepId {
    #[default]
    Welcome,
    Email,
    Password,
    SignupDetails,
    ProfilePhoto,
    Verification,
    ForgotPassword,
    ResetPassword,
    Phone,
}

impl StepId {
    /// Fixed predecessor used by the back button.
    pub fn previous(self) -> StepId {
        match self {
            Self::Email => Self::Welcome,
            Self::Password => Self::Email,
            Self::SignupDetails => Self::Email,
            Self::ProfilePhoto => Self::SignupDetails,
            _ => Self::Welcome,
        }
    }

    /// Whether this step shows the back button and progress dots.
    pub fn shows_progress(self) -> bool {
        !matches!(
            self,
            Self::Welcome | Self::Phone | Self::ForgotPassword | Self::ResetPassword
        )
    }
}

/// Login vs signup orientation, independent of the step.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuthMode {
    #[default]
    Login,
    #[strum(to_string = "signup", serialize = "register")]
    Signup,
}

impl AuthMode {
    /// Ordered steps counted by the progress indicator.
    pub fn progress_steps(self) -> &'static [StepId] {
        match self {
            Self::Login => &[StepId::Email, StepId::Password],
            Self::Signup => &[
                StepId::Email,
                StepId::SignupDetails,
                StepId::ProfilePhoto,
                StepId::Verification,
            ],
        }
    }
}

/// Progress dots for the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub steps: &'static [StepId],
    /// Number of leading dots shown as active.
    pub active: usize,
}

impl Progress {
    /// `None` when the step hides the indicator.
    pub fn for_step(step: StepId, mode: AuthMode) -> Option<Self> {
        if !step.shows_progress() {
            return None;
        }
        let steps = mode.progress_steps();
        let active = steps
            .iter()
            .position(|candidate| *candidate == step)
            .map_or(0, |index| index + 1);
        Some(Self { steps, active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn step_names_are_kebab_case() {
        assert_eq!(StepId::SignupDetails.to_string(), "signup-details");
        assert_eq!("forgot-password".parse::<StepId>().unwrap(), StepId::ForgotPassword);
        assert!("signup_details".parse::<StepId>().is_err());
    }

    #[test]
    fn every_step_round_trips_through_its_name() {
        for step in StepId::iter() {
            assert_eq!(step.to_string().parse::<StepId>().unwrap(), step);
        }
    }

    #[test]
    fn retreat_table() {
        assert_eq!(StepId::Email.previous(), StepId::Welcome);
        assert_eq!(StepId::Password.previous(), StepId::Email);
        assert_eq!(StepId::SignupDetails.previous(), StepId::Email);
        assert_eq!(StepId::ProfilePhoto.previous(), StepId::SignupDetails);
        for step in [
            StepId::Welcome,
            StepId::Verification,
            StepId::ForgotPassword,
            StepId::ResetPassword,
            StepId::Phone,
        ] {
            assert_eq!(step.previous(), StepId::Welcome, "{step}");
        }
    }

    #[test]
    fn register_is_an_alias_for_signup() {
        assert_eq!("register".parse::<AuthMode>().unwrap(), AuthMode::Signup);
        assert_eq!("signup".parse::<AuthMode>().unwrap(), AuthMode::Signup);
        assert_eq!(AuthMode::Signup.to_string(), "signup");
        assert!("phone".parse::<AuthMode>().is_err());
    }

    #[test]
    fn reset_steps_hide_progress() {
        assert_eq!(Progress::for_step(StepId::ForgotPassword, AuthMode::Login), None);
        assert_eq!(Progress::for_step(StepId::ResetPassword, AuthMode::Signup), None);
        assert_eq!(Progress::for_step(StepId::Welcome, AuthMode::Login), None);
        assert_eq!(Progress::for_step(StepId::Phone, AuthMode::Login), None);
    }

    #[test]
    fn progress_counts_active_dots() {
        let login = Progress::for_step(StepId::Password, AuthMode::Login).unwrap();
        assert_eq!(login.steps.len(), 2);
        assert_eq!(login.active, 2);

        let signup = Progress::for_step(StepId::ProfilePhoto, AuthMode::Signup).unwrap();
        assert_eq!(signup.steps.len(), 4);
        assert_eq!(signup.active, 3);

        // A signup-only step viewed in login mode lights no dots.
        let mismatch = Progress::for_step(StepId::Verification, AuthMode::Login).unwrap();
        assert_eq!(mismatch.active, 0);
    }
}
