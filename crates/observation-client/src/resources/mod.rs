//! Thin resource wrappers over the gateway
//!
//! Each resource borrows the client and only builds an endpoint path and
//! request options.

mod badges;
mod challenges;
mod countries;
mod exports;
mod groups;
mod languages;
mod locations;
mod lookups;
mod media;
mod nia;
mod observations;
mod region_species_lists;
mod regions;
mod sessions;
mod species;
mod transects;
mod users;

pub use badges::Badges;
pub use challenges::{Challenges, RankingBy};
pub use countries::Countries;
pub use exports::Exports;
pub use groups::Groups;
pub use languages::Languages;
pub use locations::Locations;
pub use lookups::Lookups;
pub use media::Media;
pub use nia::{IdentifyImage, Nia};
pub use observations::Observations;
pub use region_species_lists::RegionSpeciesLists;
pub use regions::Regions;
pub use sessions::Sessions;
pub use species::Species;
pub use transects::Transects;
pub use users::Users;
