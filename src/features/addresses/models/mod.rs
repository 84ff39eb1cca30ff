mod address;
mod owner;
mod violation;

pub use address::{Address, AddressData, AddressPatch, AddressSelection, Branch, DistrictLeaf};
pub use owner::{Owner, OwnerKind};
pub use violation::{Violation, ViolationKind};
