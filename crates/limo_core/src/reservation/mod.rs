//! Reservation edit/finalize payload construction.
//!
//! [`build`] merges a [`BookingSnapshot`] with the driver's [`UserEditSet`],
//! resolves airport and airline names against [`ReferenceLookups`], runs the
//! rate engine and returns a request with every field populated.

pub mod builder;
pub mod lookup;
pub mod request;
pub mod snapshot;
pub mod transfer;

pub use builder::{build, ReservationPayloadBuilder, DEFAULT_TRANSFER_TYPE};
pub use lookup::{
    resolve, resolve_airline, resolve_airport, AirlineOption, AirportOption, LookupEntry,
    LookupMatch, ReferenceLookups,
};
pub use request::{
    ExtraStopPayload, LegPayload, PassengerPayload, PayloadWarning, RateLinePayload, RatePayload,
    ReservationEditRequest,
};
pub use snapshot::{
    BookingSnapshot, ExtraStop, LegEdit, LegSnapshot, PassengerInfo, RouteEstimate, UserEditSet,
    VehicleInfo,
};
pub use transfer::{LegKind, TransferType};
