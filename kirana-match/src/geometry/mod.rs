//! Wire-plane geometry for the three projection views.
//!
//! Each view measures the drift coordinate x directly and a wire coordinate
//! `w = z·cos θ − y·sin θ`, the projection of the global (y, z) plane onto
//! the axis perpendicular to that view's wires. Two views at distinct
//! angles determine (y, z) and therefore the wire coordinate seen by the
//! third view.

mod transform;

pub use transform::{DetectorGeometry, MergedPosition, Unresolvable};
