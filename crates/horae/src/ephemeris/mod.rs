pub mod adapter;
pub mod provider;
pub mod search;
pub mod time;
pub mod types;

pub use adapter::SwissEphemerisAdapter;
pub use provider::{EphemerisError, EphemerisProvider};
pub use types::{EclipticPosition, EquatorialPosition, ObserverLocation, RiseSetDirection};
