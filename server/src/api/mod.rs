//! REST handlers, organized by resource:
//! - Users: registration and profiles
//! - Venues: catalog CRUD and availability checks
//! - Bookings: requests, approval and payment
//! - Saved venues: per-user bookmarks
//! - Admin: dashboard summary

pub mod admin;
pub mod bookings;
pub mod saved_venues;
pub mod users;
pub mod venues;
