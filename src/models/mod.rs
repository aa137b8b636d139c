pub mod expense;
pub mod itinerary;
pub mod plan;
pub mod trip;
