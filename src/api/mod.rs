pub mod add_ons;
pub mod agents;
pub mod auth;
pub mod bookings;
pub mod context;
pub mod coupons;
pub mod customers;
pub mod employees;
pub mod helpers;
pub mod middleware;
pub mod packages;
pub mod realtime;
pub mod services;
pub mod sms;
pub mod status;
pub mod timeslots;
pub mod validation;
pub mod vehicles;
