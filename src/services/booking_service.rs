use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use crate::{
    dto::booking::{BookingCreated, CarServiceList, CreateBookingRequest},
    entity::{
        car_services::{Column as ServiceCol, Entity as CarServices},
        service_bookings::ActiveModel as BookingActive,
    },
    error::{AppError, AppResult, FieldError},
    models::{CarService, ServiceBooking},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_services(state: &AppState) -> AppResult<ApiResponse<CarServiceList>> {
    let items = CarServices::find()
        .order_by_asc(ServiceCol::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(|model| CarService {
            id: model.id,
            name: model.name,
            price: model.price,
            duration_minutes: model.duration_minutes,
        })
        .collect();
    Ok(ApiResponse::success(
        "Car services",
        CarServiceList { items },
        None,
    ))
}

/// Record a workshop booking request. The booking is only stored; any
/// notification to the workshop happens outside this service.
pub async fn create_booking(
    state: &AppState,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<BookingCreated>> {
    let mut errors = Vec::new();
    if payload.customer_name.trim().is_empty() {
        errors.push(FieldError::new("customer_name", "required"));
    }
    if payload.customer_email.trim().is_empty() {
        errors.push(FieldError::new("customer_email", "required"));
    } else if !payload.customer_email.contains('@') {
        errors.push(FieldError::new("customer_email", "not a valid email address"));
    }
    if payload.customer_phone.trim().is_empty() {
        errors.push(FieldError::new("customer_phone", "required"));
    }
    if payload.end_time <= payload.start_time {
        errors.push(FieldError::new("end_time", "must be after start_time"));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let service = CarServices::find_by_id(payload.car_service_id)
        .one(&state.orm)
        .await?;
    if service.is_none() {
        return Err(AppError::NotFound);
    }

    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        car_service_id: Set(payload.car_service_id),
        day: Set(payload.day),
        start_time: Set(payload.start_time),
        end_time: Set(payload.end_time),
        customer_name: Set(payload.customer_name),
        customer_email: Set(payload.customer_email),
        customer_phone: Set(payload.customer_phone),
        notes: Set(payload.notes),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    Ok(ApiResponse::success(
        "Booking created",
        BookingCreated {
            booking: ServiceBooking {
                id: booking.id,
                car_service_id: booking.car_service_id,
                day: booking.day,
                start_time: booking.start_time,
                end_time: booking.end_time,
                customer_name: booking.customer_name,
                customer_email: booking.customer_email,
                customer_phone: booking.customer_phone,
                notes: booking.notes,
                created_at: booking.created_at.with_timezone(&Utc),
            },
        },
        Some(Meta::empty()),
    ))
}
