//! Domain-level command types
//!
//! These structs are the inputs of the domain services and are **not**
//! exposed over the public API. The REST layer maps the public DTOs from the
//! `shared` crate into these, parsing dates and times on the way in.

pub mod lot {
    use crate::domain::models::lot::{LotStatus, MapGeometry};

    #[derive(Debug, Clone)]
    pub struct CreateLotCommand {
        pub block: String,
        pub lot_number: String,
        pub area_sqm: f64,
        pub status: LotStatus,
        pub geometry: MapGeometry,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateLotCommand {
        pub area_sqm: Option<f64>,
        pub status: Option<LotStatus>,
        pub map_x: Option<f64>,
        pub map_y: Option<f64>,
        pub map_width: Option<f64>,
        pub map_height: Option<f64>,
    }
}

pub mod resident {
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    pub struct SignUpCommand {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub phone: String,
        pub lot_id: Option<String>,
        pub is_household_head: bool,
        pub move_in_date: Option<NaiveDate>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateResidentCommand {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub email: Option<String>,
        pub phone: Option<String>,
    }
}

pub mod dues {
    use crate::domain::ledger::Period;
    use crate::domain::models::dues::PaymentEvent;

    #[derive(Debug, Clone)]
    pub struct RecordPaymentCommand {
        pub resident_id: String,
        pub period: Period,
        pub amount_cents: i64,
        pub reference: Option<String>,
        pub note: Option<String>,
    }

    #[derive(Debug, Clone)]
    pub struct AdvancePaymentCommand {
        pub resident_id: String,
        pub from: Period,
        pub months: u32,
        pub reference: String,
    }

    #[derive(Debug, Clone)]
    pub struct SetRateCommand {
        pub effective: Period,
        pub amount_cents: i64,
    }

    /// Outcome of recording money against the ledger
    #[derive(Debug, Clone)]
    pub struct PaymentResult {
        pub events: Vec<PaymentEvent>,
        /// False when the reference had already been applied
        pub applied: bool,
    }
}

pub mod amenity {
    use chrono::NaiveTime;

    use crate::domain::models::amenity::AmenityKind;

    #[derive(Debug, Clone)]
    pub struct CreateAmenityCommand {
        pub name: String,
        pub kind: AmenityKind,
        pub open_time: NaiveTime,
        pub close_time: NaiveTime,
        pub hourly_rate_cents: i64,
        pub max_hours_per_booking: u32,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateAmenityCommand {
        pub name: Option<String>,
        pub open_time: Option<NaiveTime>,
        pub close_time: Option<NaiveTime>,
        pub hourly_rate_cents: Option<i64>,
        pub max_hours_per_booking: Option<u32>,
        pub is_active: Option<bool>,
    }
}

pub mod reservation {
    use chrono::{NaiveDate, NaiveTime};

    use crate::domain::conflict::TimeSlot;
    use crate::domain::models::reservation::Reservation;

    #[derive(Debug, Clone)]
    pub struct HoldReservationCommand {
        pub amenity_id: String,
        pub resident_id: String,
        pub date: NaiveDate,
        pub start_time: NaiveTime,
        pub end_time: NaiveTime,
        pub purpose: Option<String>,
    }

    /// Booked and free windows for one amenity on one date
    #[derive(Debug, Clone)]
    pub struct Availability {
        pub amenity_id: String,
        pub date: NaiveDate,
        pub open_time: NaiveTime,
        pub close_time: NaiveTime,
        pub booked: Vec<Reservation>,
        pub free: Vec<TimeSlot>,
    }
}

pub mod vehicle {
    #[derive(Debug, Clone)]
    pub struct RegisterVehicleCommand {
        pub resident_id: String,
        pub plate_number: String,
        pub make: String,
        pub model: String,
        pub color: String,
    }
}
