//! Wire types shared between the HOA backend and its clients.
//!
//! Dates travel as `YYYY-MM-DD`, times of day as `HH:MM` and timestamps as
//! RFC 3339 strings. Money is always integer cents.

use serde::{Deserialize, Serialize};

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

// ---------------------------------------------------------------------------
// Lots
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LotStatus {
    Vacant,
    Occupied,
    ForSale,
    UnderConstruction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    pub id: String,
    pub block: String,
    pub lot_number: String,
    pub area_sqm: f64,
    pub status: LotStatus,
    pub map_x: f64,
    pub map_y: f64,
    pub map_width: f64,
    pub map_height: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateLotRequest {
    pub block: String,
    pub lot_number: String,
    pub area_sqm: f64,
    /// Defaults to `Vacant` when omitted
    pub status: Option<LotStatus>,
    pub map_x: f64,
    pub map_y: f64,
    pub map_width: f64,
    pub map_height: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateLotRequest {
    pub area_sqm: Option<f64>,
    pub status: Option<LotStatus>,
    pub map_x: Option<f64>,
    pub map_y: Option<f64>,
    pub map_width: Option<f64>,
    pub map_height: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotResponse {
    pub lot: Lot,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotListResponse {
    pub lots: Vec<Lot>,
}

/// One drawable cell of the lot map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotMapEntry {
    pub lot_id: String,
    pub label: String,
    pub status: LotStatus,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Display name of the approved household head, if any
    pub household_head: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LotMapResponse {
    pub entries: Vec<LotMapEntry>,
    pub width: f64,
    pub height: f64,
}

// ---------------------------------------------------------------------------
// Residents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResidentStatus {
    Pending,
    Approved,
    Rejected,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub lot_id: Option<String>,
    pub is_household_head: bool,
    pub status: ResidentStatus,
    pub move_in_date: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub lot_id: Option<String>,
    pub is_household_head: bool,
    /// Defaults to today when omitted
    pub move_in_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateResidentRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentResponse {
    pub resident: Resident,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidentListResponse {
    pub residents: Vec<Resident>,
}

// ---------------------------------------------------------------------------
// Dues
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentKind {
    Regular,
    Advance,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    pub resident_id: String,
    pub year: i32,
    pub month: u32,
    pub amount_cents: i64,
    pub kind: PaymentKind,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub recorded_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub year: i32,
    pub month: u32,
    pub amount_cents: i64,
    /// Idempotency key; replaying the same key records nothing new
    pub reference: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancePaymentRequest {
    pub from_year: i32,
    pub from_month: u32,
    pub months: u32,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub events: Vec<PaymentEvent>,
    /// False when the request was a replay of an earlier reference
    pub applied: bool,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuesRate {
    pub id: String,
    pub effective_year: i32,
    pub effective_month: u32,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetDuesRateRequest {
    pub effective_year: i32,
    pub effective_month: u32,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuesRateListResponse {
    pub rates: Vec<DuesRate>,
    pub default_monthly_cents: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuesStatus {
    Paid,
    Partial,
    Unpaid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementRow {
    pub year: i32,
    pub month: u32,
    pub rate_cents: i64,
    pub carried_in_cents: i64,
    pub credit_in_cents: i64,
    pub required_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
    pub credit_out_cents: i64,
    pub status: DuesStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuesStatement {
    pub resident_id: String,
    pub rows: Vec<StatementRow>,
    pub total_billed_cents: i64,
    pub total_paid_cents: i64,
    pub balance_cents: i64,
    pub credit_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub resident_id: String,
    pub year: i32,
    pub month: u32,
    pub balance_cents: i64,
    pub credit_cents: i64,
}

// ---------------------------------------------------------------------------
// Amenities and reservations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmenityKind {
    Court,
    Gazebo,
    Parking,
    Pool,
    Clubhouse,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Amenity {
    pub id: String,
    pub name: String,
    pub kind: AmenityKind,
    pub open_time: String,
    pub close_time: String,
    pub hourly_rate_cents: i64,
    pub max_hours_per_booking: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAmenityRequest {
    pub name: String,
    pub kind: AmenityKind,
    pub open_time: String,
    pub close_time: String,
    pub hourly_rate_cents: i64,
    pub max_hours_per_booking: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateAmenityRequest {
    pub name: Option<String>,
    pub open_time: Option<String>,
    pub close_time: Option<String>,
    pub hourly_rate_cents: Option<i64>,
    pub max_hours_per_booking: Option<u32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityResponse {
    pub amenity: Amenity,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmenityListResponse {
    pub amenities: Vec<Amenity>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Held,
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub amenity_id: String,
    pub resident_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: ReservationStatus,
    pub fee_cents: i64,
    pub hold_expires_at: Option<String>,
    pub purpose: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateReservationRequest {
    pub amenity_id: String,
    pub resident_id: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationResponse {
    pub reservation: Reservation,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationListResponse {
    pub reservations: Vec<Reservation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilityResponse {
    pub amenity_id: String,
    pub date: String,
    pub open_time: String,
    pub close_time: String,
    pub booked: Vec<TimeWindow>,
    pub free: Vec<TimeWindow>,
}

// ---------------------------------------------------------------------------
// Vehicles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    Pending,
    Active,
    Revoked,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub resident_id: String,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
    pub sticker_number: Option<String>,
    pub status: VehicleStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterVehicleRequest {
    pub resident_id: String,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleResponse {
    pub vehicle: Vehicle,
    pub success_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleListResponse {
    pub vehicles: Vec<Vehicle>,
}

// ---------------------------------------------------------------------------
// Admin access and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminVerifyRequest {
    pub access_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminVerifyResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessStatsResponse {
    pub total_attempts: usize,
    pub successful_attempts: usize,
    pub failed_attempts: usize,
    pub success_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminAccessAttempt {
    pub id: i64,
    pub success: bool,
    pub attempted_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessAttemptListResponse {
    pub attempts: Vec<AdminAccessAttempt>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResidentCounts {
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    pub inactive: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LotOccupancy {
    pub total: usize,
    pub vacant: usize,
    pub occupied: usize,
    pub for_sale: usize,
    pub under_construction: usize,
    /// Occupied lots as a percentage of all lots
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardResponse {
    pub year: i32,
    pub month: u32,
    pub residents: ResidentCounts,
    pub lots: LotOccupancy,
    pub active_vehicles: usize,
    pub collected_cents: i64,
    pub outstanding_cents: i64,
    pub delinquent_residents: usize,
    pub upcoming_reservations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelinquencyRow {
    pub resident_id: String,
    pub name: String,
    pub lot_label: Option<String>,
    pub balance_cents: i64,
    pub months_unpaid: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelinquencyReport {
    pub year: i32,
    pub month: u32,
    pub rows: Vec<DelinquencyRow>,
    pub total_outstanding_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionMonth {
    pub month: u32,
    pub collected_cents: i64,
    pub payment_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionReport {
    pub year: i32,
    pub months: Vec<CollectionMonth>,
    pub total_cents: i64,
}
