//! Multi-step registration flow.
//!
//! Drives a draft account through identity collection, address
//! collection and email verification before it is finalized. Moving
//! backwards never discards what the user already entered.

use circurent_storage::Address;
use thiserror::Error;

/// Minimum password length accepted at the identity step.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validation failures surfaced to the client while stepping the flow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter your name")]
    MissingName,

    #[error("Username must be 3-20 characters, only lowercase letters, numbers, and underscores allowed")]
    UsernameFormat,

    #[error("Invalid email format")]
    EmailFormat,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Please wait for the availability check to complete")]
    AvailabilityCheckPending,

    #[error("Please fill in all address fields")]
    IncompleteAddress,

    #[error("Please wait for address validation")]
    AddressNotValidated,

    #[error("Please verify your email first")]
    EmailNotVerified,

    #[error("Step out of order")]
    OutOfOrder,
}

/// Trim surrounding whitespace and lowercase.
pub fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}

/// Check a normalized username against the accepted shape:
/// 3 to 20 characters, each a lowercase letter, digit or underscore.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    if !(3..=20).contains(&len) {
        return false;
    }
    username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// Minimal shape check for an email address.
pub fn is_plausible_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

/// Result of an advisory availability lookup.
///
/// Advisory only. Finalization re-checks against the store and that
/// check alone is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilitySignal {
    Available,
    Taken,
    Checking,
}

/// Where the flow currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationStep {
    CollectingIdentity,
    CollectingAddress,
    VerifyingEmail,
    Completed,
}

/// Identity fields submitted at the first step.
#[derive(Debug, Clone)]
pub struct IdentityInput {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Everything collected so far. Survives backwards navigation.
#[derive(Debug, Clone, Default)]
pub struct RegistrationDraft {
    pub name: String,
    pub username: String,
    /// Trimmed as submitted. This exact string keys the verification code.
    pub email: String,
    pub password: String,
    pub address: Option<Address>,
}

/// The registration state machine.
#[derive(Debug)]
pub struct RegistrationFlow {
    step: RegistrationStep,
    draft: RegistrationDraft,
}

impl RegistrationFlow {
    pub fn new() -> Self {
        Self {
            step: RegistrationStep::CollectingIdentity,
            draft: RegistrationDraft::default(),
        }
    }

    pub fn step(&self) -> RegistrationStep {
        self.step
    }

    pub fn draft(&self) -> &RegistrationDraft {
        &self.draft
    }

    /// Validate and record the identity step, advancing to address
    /// collection on success.
    pub fn submit_identity(
        &mut self,
        input: IdentityInput,
        email_availability: AvailabilitySignal,
    ) -> Result<(), ValidationError> {
        if self.step != RegistrationStep::CollectingIdentity {
            return Err(ValidationError::OutOfOrder);
        }

        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        let username = normalize(&input.username);
        if !is_valid_username(&username) {
            return Err(ValidationError::UsernameFormat);
        }

        let email = input.email.trim().to_string();
        if !is_plausible_email(&email) {
            return Err(ValidationError::EmailFormat);
        }

        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(ValidationError::PasswordTooShort);
        }
        if input.password != input.confirm_password {
            return Err(ValidationError::PasswordMismatch);
        }

        match email_availability {
            AvailabilitySignal::Available => {}
            AvailabilitySignal::Taken => return Err(ValidationError::EmailTaken),
            AvailabilitySignal::Checking => {
                return Err(ValidationError::AvailabilityCheckPending)
            }
        }

        self.draft.name = name;
        self.draft.username = username;
        self.draft.email = email;
        self.draft.password = input.password;
        self.step = RegistrationStep::CollectingAddress;
        Ok(())
    }

    /// Validate and record the address step, advancing to email
    /// verification on success. Issuing the verification code on entry
    /// is the caller's job.
    pub fn submit_address(
        &mut self,
        address: Address,
        address_validated: bool,
    ) -> Result<(), ValidationError> {
        if self.step != RegistrationStep::CollectingAddress {
            return Err(ValidationError::OutOfOrder);
        }

        if address.street.trim().is_empty()
            || address.city.trim().is_empty()
            || address.state.trim().is_empty()
            || address.postal_code.trim().is_empty()
            || address.country.trim().is_empty()
        {
            return Err(ValidationError::IncompleteAddress);
        }
        if !address_validated {
            return Err(ValidationError::AddressNotValidated);
        }

        self.draft.address = Some(address);
        self.step = RegistrationStep::VerifyingEmail;
        Ok(())
    }

    /// Record the verification outcome. Only a verified email completes
    /// the flow.
    pub fn record_verification(&mut self, verified: bool) -> Result<(), ValidationError> {
        if self.step != RegistrationStep::VerifyingEmail {
            return Err(ValidationError::OutOfOrder);
        }
        if !verified {
            return Err(ValidationError::EmailNotVerified);
        }
        self.step = RegistrationStep::Completed;
        Ok(())
    }

    /// Move one step backwards, keeping the draft intact. Returns false
    /// when there is nowhere to go back to.
    pub fn back(&mut self) -> bool {
        match self.step {
            RegistrationStep::CollectingAddress => {
                self.step = RegistrationStep::CollectingIdentity;
                true
            }
            RegistrationStep::VerifyingEmail => {
                self.step = RegistrationStep::CollectingAddress;
                true
            }
            RegistrationStep::CollectingIdentity | RegistrationStep::Completed => false,
        }
    }
}

impl Default for RegistrationFlow {
    fn default() -> Self {
        Self::new()
    }
}
