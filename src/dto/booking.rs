use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{CarService, ServiceBooking};

#[derive(Debug, Serialize, ToSchema)]
pub struct CarServiceList {
    pub items: Vec<CarService>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub car_service_id: Uuid,
    pub day: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingCreated {
    pub booking: ServiceBooking,
}
