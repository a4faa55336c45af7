//! Registration form controller.
//!
//! # Responsibility
//! - Hold the registration draft and validate it before any store call.
//! - Allow at most one in-flight create per form.
//! - Show a success banner that expires after a fixed delay.
//!
//! # Invariants
//! - A rejected or failed submission keeps the draft intact.
//! - Banner expiry is keyed by generation; a newer success or submission
//!   invalidates older expiries.
//! - Completions issued before `reset()` are discarded.

use crate::clock::Clock;
use crate::controller::notice::Notice;
use crate::model::record::{Field, NewRecord, Record, RecordFields, ValidationError};
use crate::store::record_store::{RecordStore, StoreError, StoreResult};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default lifetime of the success banner.
pub const DEFAULT_SUCCESS_BANNER_MS: i64 = 3_000;

const MSG_REGISTERED: &str = "Registration successful!";
const MSG_SUBMIT_FAILED: &str = "Error submitting form.";

#[derive(Debug)]
pub enum RegistrationError {
    Validation(ValidationError),
    Store(StoreError),
    /// A previous submission has not completed yet.
    SubmitInFlight,
    /// The ticket belongs to a submission this form no longer tracks.
    StaleTicket,
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
            Self::SubmitInFlight => write!(f, "a registration is already being submitted"),
            Self::StaleTicket => write!(f, "registration result arrived after the form was reset"),
        }
    }
}

impl Error for RegistrationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RegistrationError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RegistrationError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Handle for one scheduled banner expiry.
///
/// Hosts with their own timers can fire it through
/// [`RegistrationForm::expire_banner`]; it only clears the banner it was
/// issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerExpiry {
    pub generation: u64,
    pub due_at_ms: i64,
}

#[derive(Debug, Default)]
struct SuccessBanner {
    generation: u64,
    due_at_ms: Option<i64>,
}

impl SuccessBanner {
    fn show(&mut self, now_ms: i64, delay_ms: i64) -> BannerExpiry {
        self.generation += 1;
        let due_at_ms = now_ms.saturating_add(delay_ms);
        self.due_at_ms = Some(due_at_ms);
        BannerExpiry {
            generation: self.generation,
            due_at_ms,
        }
    }

    fn hide(&mut self) {
        self.generation += 1;
        self.due_at_ms = None;
    }

    fn is_visible(&self, now_ms: i64) -> bool {
        self.due_at_ms.is_some_and(|due| now_ms < due)
    }
}

/// Proof of one pending create. Completing it consumes it.
#[derive(Debug)]
pub struct SubmitTicket {
    id: u64,
    epoch: u64,
    new_record: NewRecord,
}

impl SubmitTicket {
    /// Payload to hand to `RecordStore::create`.
    pub fn new_record(&self) -> &NewRecord {
        &self.new_record
    }
}

/// Controller behind the registration view.
pub struct RegistrationForm<S: RecordStore, C: Clock> {
    store: S,
    clock: C,
    draft: RecordFields,
    banner_delay_ms: i64,
    banner: SuccessBanner,
    in_flight: Option<u64>,
    next_ticket: u64,
    epoch: u64,
    notice: Option<Notice>,
}

impl<S: RecordStore, C: Clock> RegistrationForm<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            draft: RecordFields::default(),
            banner_delay_ms: DEFAULT_SUCCESS_BANNER_MS,
            banner: SuccessBanner::default(),
            in_flight: None,
            next_ticket: 0,
            epoch: 0,
            notice: None,
        }
    }

    /// Overrides the success banner lifetime. Non-positive values are
    /// clamped to 1 ms.
    pub fn with_banner_delay_ms(mut self, delay_ms: i64) -> Self {
        self.banner_delay_ms = delay_ms.max(1);
        self
    }

    pub fn draft(&self) -> &RecordFields {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut RecordFields {
        &mut self.draft
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
    }

    /// True while a create is in flight; the submit control should be
    /// disabled.
    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Validates the draft and marks a submission in flight.
    ///
    /// The returned ticket holds the form's only submit slot. Hand it back
    /// through [`Self::complete_submit`] or [`Self::abandon_submit`];
    /// dropping it keeps the form blocked until [`Self::reset`].
    ///
    /// # Errors
    /// - `SubmitInFlight` when a previous ticket is still open.
    /// - `Validation` for the first failing field rule.
    pub fn begin_submit(&mut self) -> Result<SubmitTicket, RegistrationError> {
        if self.in_flight.is_some() {
            debug!("event=register_submit module=controller status=blocked");
            return Err(RegistrationError::SubmitInFlight);
        }

        if let Err(err) = self.draft.validate_for_create() {
            debug!("event=register_submit module=controller status=invalid");
            self.notice = Some(Notice::error(err.to_string()));
            return Err(err.into());
        }

        self.next_ticket += 1;
        let ticket = SubmitTicket {
            id: self.next_ticket,
            epoch: self.epoch,
            new_record: NewRecord {
                fields: self.draft.clone(),
                created_at: self.clock.now_ms(),
            },
        };
        self.in_flight = Some(ticket.id);
        self.banner.hide();
        self.notice = None;
        Ok(ticket)
    }

    /// Applies the store outcome of a ticket from [`Self::begin_submit`].
    ///
    /// On success the draft is cleared and the banner shown; on failure the
    /// draft is kept and an error notice recorded.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        result: StoreResult<Record>,
    ) -> Result<Record, RegistrationError> {
        if ticket.epoch != self.epoch || self.in_flight != Some(ticket.id) {
            warn!(
                "event=register_complete module=controller status=stale ticket={}",
                ticket.id
            );
            return Err(RegistrationError::StaleTicket);
        }
        self.in_flight = None;

        match result {
            Ok(record) => {
                self.draft.clear();
                let expiry = self
                    .banner
                    .show(self.clock.now_ms(), self.banner_delay_ms);
                info!(
                    "event=register_complete module=controller status=ok id={} banner_due_ms={}",
                    record.id, expiry.due_at_ms
                );
                self.notice = Some(Notice::success(MSG_REGISTERED));
                Ok(record)
            }
            Err(err) => {
                warn!("event=register_complete module=controller status=error error={err}");
                self.notice = Some(Notice::error(MSG_SUBMIT_FAILED));
                Err(err.into())
            }
        }
    }

    /// Releases the submit slot without applying any result.
    ///
    /// For hosts whose create call never produced an outcome. The draft and
    /// banner are left as they are. Returns whether the ticket was the open
    /// one.
    pub fn abandon_submit(&mut self, ticket: SubmitTicket) -> bool {
        if ticket.epoch != self.epoch || self.in_flight != Some(ticket.id) {
            return false;
        }
        debug!(
            "event=register_abandon module=controller ticket={}",
            ticket.id
        );
        self.in_flight = None;
        true
    }

    /// Validates and creates the draft through this form's store.
    pub fn submit(&mut self) -> Result<Record, RegistrationError> {
        let ticket = self.begin_submit()?;
        let result = self.store.create(ticket.new_record());
        self.complete_submit(ticket, result)
    }

    /// Whether the success banner is showing right now.
    pub fn is_success_visible(&self) -> bool {
        self.banner.is_visible(self.clock.now_ms())
    }

    /// Expiry handle for the banner currently showing, if any.
    pub fn banner_expiry(&self) -> Option<BannerExpiry> {
        self.banner.due_at_ms.map(|due_at_ms| BannerExpiry {
            generation: self.banner.generation,
            due_at_ms,
        })
    }

    /// Fires a scheduled expiry. Ignored unless it matches the banner
    /// currently showing. Returns whether the banner was cleared.
    pub fn expire_banner(&mut self, expiry: BannerExpiry) -> bool {
        if self.banner.due_at_ms.is_none() || expiry.generation != self.banner.generation {
            return false;
        }
        self.banner.hide();
        true
    }

    /// Clears the banner once its deadline passed. Returns whether it did.
    pub fn tick(&mut self) -> bool {
        match self.banner.due_at_ms {
            Some(due) if self.clock.now_ms() >= due => {
                self.banner.hide();
                true
            }
            _ => false,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Returns and clears the last notice.
    pub fn take_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Returns the form to its initial state after navigating away.
    ///
    /// Any open ticket becomes stale and its completion is discarded.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.in_flight = None;
        self.draft.clear();
        self.banner.hide();
        self.notice = None;
    }
}
