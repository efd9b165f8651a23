pub mod place_coordinator;

pub use place_coordinator::{PlaceCoordinator, PlaceDraft};
