use crate::locations::repository::location_store::{
  GeoLocationStore, InMemoryGeoLocationStore,
};
use crate::trips::repository::trip_repository::{
  InMemoryTripRepository, TripRepository,
};
use crate::users::repository::user_repository::{
  InMemoryUserRepository, UserRepository,
};

/// Handle to the realtime backend. Injected into the lifecycle controller,
/// driver discovery and the HTTP handlers so tests can substitute any store.
pub trait Backend: 'static {
  type Users: UserRepository;
  type Trips: TripRepository;
  type Locations: GeoLocationStore;

  fn users(&self) -> &Self::Users;
  fn trips(&self) -> &Self::Trips;
  fn locations(&self) -> &Self::Locations;
}

pub struct RealtimeBackend<
  UR = InMemoryUserRepository,
  TR = InMemoryTripRepository,
  GL = InMemoryGeoLocationStore,
> {
  users: UR,
  trips: TR,
  locations: GL,
}

impl RealtimeBackend {
  pub fn in_memory() -> Self {
    Self::new(
      InMemoryUserRepository::new(),
      InMemoryTripRepository::new(),
      InMemoryGeoLocationStore::new(),
    )
  }
}

impl<UR, TR, GL> RealtimeBackend<UR, TR, GL> {
  pub fn new(users: UR, trips: TR, locations: GL) -> Self {
    Self {
      users,
      trips,
      locations,
    }
  }
}

impl<UR, TR, GL> Backend for RealtimeBackend<UR, TR, GL>
where
  UR: UserRepository + 'static,
  TR: TripRepository + 'static,
  GL: GeoLocationStore + 'static,
{
  type Users = UR;
  type Trips = TR;
  type Locations = GL;

  fn users(&self) -> &UR {
    &self.users
  }

  fn trips(&self) -> &TR {
    &self.trips
  }

  fn locations(&self) -> &GL {
    &self.locations
  }
}
