//! Booking entity, stay dates, pricing and the status state machine.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{UserRole, Villa};
use crate::errors::{AppError, AppResult};

/// Half-open date range `[check_in, check_out)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StayDates {
    #[schema(value_type = String, format = Date, example = "2026-07-01")]
    pub check_in: NaiveDate,
    #[schema(value_type = String, format = Date, example = "2026-07-08")]
    pub check_out: NaiveDate,
}

impl StayDates {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> AppResult<Self> {
        if check_out <= check_in {
            return Err(AppError::validation("Check-out must be after check-in"));
        }
        Ok(Self {
            check_in,
            check_out,
        })
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    /// Back-to-back stays (one checks out the day the other checks in)
    /// do not overlap.
    pub fn overlaps(&self, other: &StayDates) -> bool {
        self.check_in < other.check_out && other.check_in < self.check_out
    }

    pub fn has_started(&self, today: NaiveDate) -> bool {
        self.check_in <= today
    }

    pub fn is_finished(&self, today: NaiveDate) -> bool {
        self.check_out <= today
    }

    /// Rules every new stay must satisfy regardless of villa.
    pub fn validate_new(&self, today: NaiveDate, max_nights: i64) -> AppResult<()> {
        if self.check_in < today {
            return Err(AppError::validation("Check-in date is in the past"));
        }
        if self.nights() > max_nights {
            return Err(AppError::validation(format!(
                "Stays are limited to {} nights",
                max_nights
            )));
        }
        Ok(())
    }
}

/// Price of a stay, all amounts in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriceBreakdown {
    pub nightly_rate_cents: i64,
    pub nights: i64,
    pub subtotal_cents: i64,
    pub cleaning_fee_cents: i64,
    pub service_fee_cents: i64,
    pub total_cents: i64,
}

impl PriceBreakdown {
    /// Service fee is a percentage of the subtotal, rounded half-up to
    /// the cent. Amounts that do not fit in an `i64` are a validation
    /// error rather than a wrapped total.
    pub fn compute(
        nightly_rate_cents: i64,
        nights: i64,
        cleaning_fee_cents: i64,
        service_fee_percent: u32,
    ) -> AppResult<Self> {
        let too_large = || AppError::validation("Stay price is too large");

        let subtotal_cents = nightly_rate_cents.checked_mul(nights).ok_or_else(too_large)?;
        let service_fee_cents = subtotal_cents
            .checked_mul(i64::from(service_fee_percent))
            .and_then(|fee| fee.checked_add(50))
            .ok_or_else(too_large)?
            / 100;
        let total_cents = subtotal_cents
            .checked_add(cleaning_fee_cents)
            .and_then(|sum| sum.checked_add(service_fee_cents))
            .ok_or_else(too_large)?;

        Ok(Self {
            nightly_rate_cents,
            nights,
            subtotal_cents,
            cleaning_fee_cents,
            service_fee_cents,
            total_cents,
        })
    }

    pub fn for_villa(villa: &Villa, dates: &StayDates, service_fee_percent: u32) -> AppResult<Self> {
        Self::compute(
            villa.price_per_night_cents,
            dates.nights(),
            villa.cleaning_fee_cents,
            service_fee_percent,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "rejected" => Ok(BookingStatus::Rejected),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(AppError::validation(format!("Invalid booking status '{}'", other))),
        }
    }

    /// Statuses that hold the villa's calendar.
    pub fn blocks_calendar(&self) -> bool {
        matches!(self, BookingStatus::Pending | BookingStatus::Confirmed)
    }

    pub fn blocking() -> [BookingStatus; 2] {
        [BookingStatus::Pending, BookingStatus::Confirmed]
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Rejected)
                | (Pending, Cancelled)
                | (Confirmed, Cancelled)
                | (Confirmed, Completed)
        )
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status change a participant asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    Confirm,
    Reject,
    Cancel,
    Complete,
}

impl BookingAction {
    pub fn target(&self) -> BookingStatus {
        match self {
            BookingAction::Confirm => BookingStatus::Confirmed,
            BookingAction::Reject => BookingStatus::Rejected,
            BookingAction::Cancel => BookingStatus::Cancelled,
            BookingAction::Complete => BookingStatus::Completed,
        }
    }
}

/// How the acting user relates to a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingParty {
    Guest,
    Host,
    Admin,
}

impl BookingParty {
    /// Resolve the caller's relation; `None` means no access at all.
    pub fn resolve(
        booking: &Booking,
        villa_owner_id: Uuid,
        user_id: Uuid,
        role: UserRole,
    ) -> Option<Self> {
        if role.is_admin() {
            Some(BookingParty::Admin)
        } else if booking.guest_id == user_id {
            Some(BookingParty::Guest)
        } else if villa_owner_id == user_id {
            Some(BookingParty::Host)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub villa_id: Uuid,
    pub guest_id: Uuid,
    #[serde(flatten)]
    pub dates: StayDates,
    pub guests: i32,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub price: PriceBreakdown,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Stay is over: completed outright, or confirmed with check-out passed.
    pub fn stay_completed(&self, today: NaiveDate) -> bool {
        match self.status {
            BookingStatus::Completed => true,
            BookingStatus::Confirmed => self.dates.is_finished(today),
            _ => false,
        }
    }

    /// Apply the actor rules for a status change and return the new status.
    pub fn check_action(
        &self,
        action: BookingAction,
        party: BookingParty,
        today: NaiveDate,
    ) -> AppResult<BookingStatus> {
        let next = action.target();
        if !self.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Cannot {} a booking that is {}",
                action_verb(action),
                self.status
            )));
        }

        match (action, party) {
            (_, BookingParty::Admin) => {}
            (BookingAction::Confirm | BookingAction::Reject, BookingParty::Host) => {}
            (BookingAction::Cancel, BookingParty::Host) => {}
            (BookingAction::Cancel, BookingParty::Guest) => {
                if self.dates.has_started(today) {
                    return Err(AppError::validation(
                        "Bookings cannot be cancelled after check-in",
                    ));
                }
            }
            (BookingAction::Complete, BookingParty::Host) => {}
            _ => return Err(AppError::Forbidden),
        }

        if action == BookingAction::Complete && !self.dates.is_finished(today) {
            return Err(AppError::validation(
                "A booking can only be completed after check-out",
            ));
        }

        Ok(next)
    }
}

fn action_verb(action: BookingAction) -> &'static str {
    match action {
        BookingAction::Confirm => "confirm",
        BookingAction::Reject => "reject",
        BookingAction::Cancel => "cancel",
        BookingAction::Complete => "complete",
    }
}

/// Platform booking rules, built from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingPolicy {
    pub service_fee_percent: u32,
    pub max_nights: i64,
}

impl BookingPolicy {
    /// Validate a prospective stay and price it. Shared by quotes and
    /// booking creation; the calendar check happens separately.
    pub fn quote(
        &self,
        villa: &Villa,
        dates: &StayDates,
        guests: i32,
        today: NaiveDate,
    ) -> AppResult<PriceBreakdown> {
        if !villa.status.is_public() {
            return Err(AppError::validation("This villa is not accepting bookings"));
        }
        dates.validate_new(today, self.max_nights)?;
        villa.check_capacity(guests)?;
        PriceBreakdown::for_villa(villa, dates, self.service_fee_percent)
    }
}

/// Row data for a new booking (status is always pending)
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub villa_id: Uuid,
    pub guest_id: Uuid,
    pub dates: StayDates,
    pub guests: i32,
    pub notes: Option<String>,
    pub price: PriceBreakdown,
}

/// Fields a guest may edit while the booking is pending
#[derive(Debug, Clone, Default)]
pub struct BookingChanges {
    pub guests: Option<i32>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DEFAULT_MAX_BOOKING_NIGHTS, MAX_CLEANING_FEE_CENTS, MAX_NIGHTLY_PRICE_CENTS};
    use crate::domain::VillaStatus;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn stay(a: &str, b: &str) -> StayDates {
        StayDates::new(d(a), d(b)).unwrap()
    }

    fn booking(status: BookingStatus, dates: StayDates) -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            villa_id: Uuid::new_v4(),
            guest_id: Uuid::new_v4(),
            dates,
            guests: 2,
            notes: None,
            status,
            price: PriceBreakdown::compute(10_000, dates.nights(), 0, 10).unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    fn villa(max_guests: i32, status: VillaStatus) -> Villa {
        let now = Utc::now();
        Villa {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Casa Blanca".to_string(),
            description: "Whitewashed house above the harbour".to_string(),
            location: "Naxos".to_string(),
            address: "1 Harbour Road".to_string(),
            price_per_night_cents: 20_000,
            cleaning_fee_cents: 4_000,
            max_guests,
            bedrooms: 2,
            bathrooms: 1,
            status,
            created_at: now,
            updated_at: now,
        }
    }

    const POLICY: BookingPolicy = BookingPolicy {
        service_fee_percent: 10,
        max_nights: 90,
    };

    #[test]
    fn quote_prices_a_valid_stay() {
        let v = villa(4, VillaStatus::Active);
        let price = POLICY
            .quote(&v, &stay("2026-07-01", "2026-07-04"), 4, d("2026-06-01"))
            .unwrap();
        assert_eq!(price.subtotal_cents, 60_000);
        assert_eq!(price.service_fee_cents, 6_000);
        assert_eq!(price.total_cents, 70_000);
    }

    #[test]
    fn quote_rejects_over_capacity_and_inactive_villas() {
        let today = d("2026-06-01");
        let dates = stay("2026-07-01", "2026-07-04");

        let small = villa(2, VillaStatus::Active);
        assert!(matches!(
            POLICY.quote(&small, &dates, 3, today),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            POLICY.quote(&small, &dates, 0, today),
            Err(AppError::Validation(_))
        ));

        let hidden = villa(6, VillaStatus::Inactive);
        assert!(POLICY.quote(&hidden, &dates, 2, today).is_err());
    }

    #[test]
    fn quote_rejects_past_and_overlong_stays() {
        let v = villa(4, VillaStatus::Active);
        let today = d("2026-06-01");
        assert!(POLICY.quote(&v, &stay("2026-05-30", "2026-06-03"), 2, today).is_err());
        assert!(POLICY.quote(&v, &stay("2026-06-02", "2026-09-30"), 2, today).is_err());
        assert!(POLICY.quote(&v, &stay("2026-06-01", "2026-06-02"), 2, today).is_ok());
    }

    #[test]
    fn stay_dates_reject_inverted_and_empty_ranges() {
        assert!(StayDates::new(d("2026-07-08"), d("2026-07-01")).is_err());
        assert!(StayDates::new(d("2026-07-01"), d("2026-07-01")).is_err());
        assert_eq!(stay("2026-07-01", "2026-07-08").nights(), 7);
    }

    #[test]
    fn overlap_is_half_open() {
        let a = stay("2026-07-01", "2026-07-08");
        assert!(a.overlaps(&stay("2026-07-07", "2026-07-10")));
        assert!(a.overlaps(&stay("2026-06-25", "2026-07-02")));
        assert!(a.overlaps(&stay("2026-07-03", "2026-07-04")));
        assert!(!a.overlaps(&stay("2026-07-08", "2026-07-12")));
        assert!(!a.overlaps(&stay("2026-06-20", "2026-07-01")));
    }

    #[test]
    fn new_stays_cannot_start_in_the_past_or_run_too_long() {
        let today = d("2026-07-01");
        assert!(stay("2026-06-30", "2026-07-03").validate_new(today, 90).is_err());
        assert!(stay("2026-07-01", "2026-07-03").validate_new(today, 90).is_ok());
        assert!(stay("2026-07-01", "2026-07-10").validate_new(today, 5).is_err());
    }

    #[test]
    fn price_breakdown_rounds_service_fee_half_up() {
        let price = PriceBreakdown::compute(12_345, 3, 5_000, 10).unwrap();
        assert_eq!(price.subtotal_cents, 37_035);
        // 3703.5 rounds up
        assert_eq!(price.service_fee_cents, 3_704);
        assert_eq!(price.total_cents, 37_035 + 5_000 + 3_704);
    }

    #[test]
    fn price_breakdown_rejects_overflowing_amounts() {
        // 6e18 subtotal fits, the 10% fee multiplication does not
        let err = PriceBreakdown::compute(200_000_000_000_000_000, 30, 0, 10).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(PriceBreakdown::compute(i64::MAX, 2, 0, 0).is_err());
        assert!(PriceBreakdown::compute(i64::MAX - 10, 1, 100, 0).is_err());
    }

    #[test]
    fn largest_listing_price_quotes_without_overflow() {
        let price = PriceBreakdown::compute(
            MAX_NIGHTLY_PRICE_CENTS,
            DEFAULT_MAX_BOOKING_NIGHTS,
            MAX_CLEANING_FEE_CENTS,
            100,
        )
        .unwrap();
        assert!(price.total_cents > price.subtotal_cents);
    }

    #[test]
    fn status_transitions() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Cancelled.can_transition_to(Confirmed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(Pending.blocks_calendar());
        assert!(!Rejected.blocks_calendar());
    }

    #[test]
    fn guest_cannot_confirm_own_booking() {
        let b = booking(BookingStatus::Pending, stay("2026-08-01", "2026-08-05"));
        let err = b
            .check_action(BookingAction::Confirm, BookingParty::Guest, d("2026-07-01"))
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
    }

    #[test]
    fn host_confirms_pending_booking() {
        let b = booking(BookingStatus::Pending, stay("2026-08-01", "2026-08-05"));
        let next = b
            .check_action(BookingAction::Confirm, BookingParty::Host, d("2026-07-01"))
            .unwrap();
        assert_eq!(next, BookingStatus::Confirmed);
    }

    #[test]
    fn guest_cancel_only_before_check_in() {
        let b = booking(BookingStatus::Confirmed, stay("2026-08-01", "2026-08-05"));
        assert!(b
            .check_action(BookingAction::Cancel, BookingParty::Guest, d("2026-07-31"))
            .is_ok());
        assert!(b
            .check_action(BookingAction::Cancel, BookingParty::Guest, d("2026-08-02"))
            .is_err());
        // hosts may still cancel mid-stay
        assert!(b
            .check_action(BookingAction::Cancel, BookingParty::Host, d("2026-08-02"))
            .is_ok());
    }

    #[test]
    fn complete_requires_check_out_passed() {
        let b = booking(BookingStatus::Confirmed, stay("2026-08-01", "2026-08-05"));
        assert!(b
            .check_action(BookingAction::Complete, BookingParty::Host, d("2026-08-04"))
            .is_err());
        assert!(b
            .check_action(BookingAction::Complete, BookingParty::Host, d("2026-08-05"))
            .is_ok());
    }

    #[test]
    fn stay_completed_rules() {
        let dates = stay("2026-08-01", "2026-08-05");
        let today = d("2026-08-10");
        assert!(booking(BookingStatus::Completed, dates).stay_completed(d("2026-07-01")));
        assert!(booking(BookingStatus::Confirmed, dates).stay_completed(today));
        assert!(!booking(BookingStatus::Confirmed, dates).stay_completed(d("2026-08-03")));
        assert!(!booking(BookingStatus::Cancelled, dates).stay_completed(today));
        assert!(!booking(BookingStatus::Pending, dates).stay_completed(today));
    }

    #[test]
    fn party_resolution() {
        let b = booking(BookingStatus::Pending, stay("2026-08-01", "2026-08-05"));
        let owner = Uuid::new_v4();
        assert_eq!(
            BookingParty::resolve(&b, owner, b.guest_id, UserRole::Guest),
            Some(BookingParty::Guest)
        );
        assert_eq!(
            BookingParty::resolve(&b, owner, owner, UserRole::Host),
            Some(BookingParty::Host)
        );
        assert_eq!(
            BookingParty::resolve(&b, owner, Uuid::new_v4(), UserRole::Admin),
            Some(BookingParty::Admin)
        );
        assert_eq!(
            BookingParty::resolve(&b, owner, Uuid::new_v4(), UserRole::Guest),
            None
        );
    }
}
