//! Multi-step credential collection.

pub mod controller;
pub mod draft;
pub mod step;
pub mod validation;

pub use controller::{
    SignupDetails, WizardController, WizardEntry, WizardState, WizardStatus, RESEND_COOLDOWN,
};
pub use draft::{DraftUpdate, FormDraft};
pub use step::{AuthMode, Progress, StepId};
pub use validation::ValidationError;
