//! Request / response DTOs, separated from the on-disk records so the wire
//! format can evolve independently of the data files.

pub mod api;
