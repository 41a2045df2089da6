//! Geohash cells for the `driver-locations` index.

use geohash::Coord;

use crate::shared::coordinate::Coordinate;

pub const DEFAULT_PRECISION: usize = 10;

/// `None` when the coordinate is out of range or the precision is not 1..=12.
pub fn encode(coordinate: &Coordinate, precision: usize) -> Option<String> {
  let coord = Coord {
    x: coordinate.longitude,
    y: coordinate.latitude,
  };
  geohash::encode(coord, precision).ok()
}

/// Centre of the cell a geohash names. Returns `None` for characters outside
/// the alphabet.
pub fn decode(hash: &str) -> Option<Coordinate> {
  geohash::decode(hash)
    .ok()
    .map(|(centre, _, _)| Coordinate::new(centre.y, centre.x))
}
