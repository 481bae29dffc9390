//! Assembles reservation edit/finalize requests.

use tracing::{debug, warn};

use super::lookup::{resolve_airline, resolve_airport, ReferenceLookups};
use super::request::{
    ExtraStopPayload, LegPayload, PassengerPayload, PayloadWarning, RateLinePayload, RatePayload,
    ReservationEditRequest,
};
use super::snapshot::{BookingSnapshot, ExtraStop, LegSnapshot, UserEditSet};
use super::transfer::{LegKind, TransferType};
use crate::error::PayloadError;
use crate::rates::{
    compute_with_policy, engine::effective_rate, RateComputationInput, RateComputationResult,
    RateGroup, RatePolicy, ServiceType,
};

/// Transfer type used when neither the edits nor the snapshot name a known one.
pub const DEFAULT_TRANSFER_TYPE: TransferType = TransferType::CityToCity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LegSide {
    Pickup,
    Dropoff,
}

impl LegSide {
    fn airport_field(self) -> &'static str {
        match self {
            LegSide::Pickup => "pickup.airport",
            LegSide::Dropoff => "dropoff.airport",
        }
    }

    fn airline_field(self) -> &'static str {
        match self {
            LegSide::Pickup => "pickup.airline",
            LegSide::Dropoff => "dropoff.airline",
        }
    }
}

/// Builds [`ReservationEditRequest`]s against a fixed set of reference lookups.
#[derive(Debug, Clone)]
pub struct ReservationPayloadBuilder<'a> {
    lookups: &'a ReferenceLookups,
    policy: RatePolicy,
}

/// Convenience wrapper around [`ReservationPayloadBuilder::build`] with the default policy.
pub fn build(
    snapshot: &BookingSnapshot,
    edits: &UserEditSet,
    lookups: &ReferenceLookups,
) -> Result<ReservationEditRequest, PayloadError> {
    ReservationPayloadBuilder::new(lookups).build(snapshot, edits)
}

impl<'a> ReservationPayloadBuilder<'a> {
    pub fn new(lookups: &'a ReferenceLookups) -> Self {
        Self {
            lookups,
            policy: RatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RatePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Merge `edits` over `snapshot` and produce a submission-ready request.
    ///
    /// Fails only when the reservation id is missing. Lookup misses and
    /// unknown labels are reported through [`ReservationEditRequest::warnings`].
    pub fn build(
        &self,
        snapshot: &BookingSnapshot,
        edits: &UserEditSet,
    ) -> Result<ReservationEditRequest, PayloadError> {
        let reservation_id = snapshot
            .reservation_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(PayloadError::MissingRequiredField("reservation_id"))?
            .to_string();

        let mut warnings = Vec::new();

        let service_type = resolve_service_type(snapshot, edits, &mut warnings);
        let transfer_type = resolve_transfer_type(snapshot, edits, &mut warnings);
        let (pickup_kind, dropoff_kind) = transfer_type.legs();

        let number_of_hours = if service_type == ServiceType::CharterTour {
            edits
                .number_of_hours
                .or(snapshot.number_of_hours)
                .unwrap_or(0)
        } else {
            0
        };
        let number_of_vehicles = edits
            .number_of_vehicles
            .or(snapshot.number_of_vehicles)
            .unwrap_or(1)
            .max(1);

        let pickup = self.build_leg(
            LegSide::Pickup,
            pickup_kind,
            &snapshot.pickup.merged_with(&edits.pickup),
            &mut warnings,
        );
        let dropoff = self.build_leg(
            LegSide::Dropoff,
            dropoff_kind,
            &snapshot.dropoff.merged_with(&edits.dropoff),
            &mut warnings,
        );

        let extra_stops = merge_extra_stops(&snapshot.extra_stops, edits.extra_stops.as_deref());

        let rate_input = RateComputationInput {
            service_type,
            number_of_hours: (service_type == ServiceType::CharterTour)
                .then_some(i64::from(number_of_hours)),
            number_of_vehicles,
            account_type: snapshot.account_type.clone().unwrap_or_default(),
            created_by: snapshot.created_by,
            reservation_type: snapshot.reservation_type.clone().unwrap_or_default(),
            dynamic_rates: edits.dynamic_rates.clone(),
            tax_is_percent: edits.tax_is_percent.clone(),
        };
        let computed = compute_with_policy(&snapshot.rates, &rate_input, &self.policy);
        let rates = rate_payload(snapshot, &rate_input, &computed);

        let (distance_meters, duration_seconds) = if edits.has_location_changed {
            match edits.recalculated_route {
                Some(route) => (route.distance_m, route.duration_secs),
                None => {
                    warn!(%reservation_id, "locations changed without a recalculated route");
                    warnings.push(PayloadWarning::RouteNotRecalculated);
                    (0.0, 0.0)
                }
            }
        } else {
            (
                snapshot.distance_meters.unwrap_or(0.0),
                snapshot.duration_seconds.unwrap_or(0.0),
            )
        };

        let passenger = PassengerPayload {
            name: pick_text(&edits.passenger.name, &snapshot.passenger.name),
            email: pick_text(&edits.passenger.email, &snapshot.passenger.email),
            phone: pick_text(&edits.passenger.phone, &snapshot.passenger.phone),
            count: edits
                .passenger
                .count
                .or(snapshot.passenger.count)
                .unwrap_or(1)
                .max(1),
            luggage_count: edits
                .passenger
                .luggage_count
                .or(snapshot.passenger.luggage_count)
                .unwrap_or(0),
        };

        debug!(
            %reservation_id,
            %service_type,
            %transfer_type,
            grand_total = computed.grand_total,
            warnings = warnings.len(),
            "built reservation edit request"
        );

        Ok(ReservationEditRequest {
            reservation_id,
            service_type,
            transfer_type,
            number_of_hours,
            number_of_vehicles,
            pickup_date: pick_text(&edits.pickup_date, &snapshot.pickup_date),
            pickup_time: pick_text(&edits.pickup_time, &snapshot.pickup_time),
            pickup,
            dropoff,
            extra_stops,
            passenger,
            vehicle_id: pick_text(&edits.vehicle_id, &snapshot.vehicle.id),
            account_type: snapshot.account_type.clone().unwrap_or_default(),
            affiliate_id: snapshot.affiliate_id.clone().unwrap_or_default(),
            reservation_type: snapshot.reservation_type.clone().unwrap_or_default(),
            distance_meters,
            duration_seconds,
            special_instructions: pick_text(
                &edits.special_instructions,
                &snapshot.special_instructions,
            ),
            rates,
            warnings,
        })
    }

    fn build_leg(
        &self,
        side: LegSide,
        kind: LegKind,
        leg: &LegSnapshot,
        warnings: &mut Vec<PayloadWarning>,
    ) -> LegPayload {
        let mut coordinate = leg.coordinate;
        let mut payload = LegPayload {
            kind,
            address: text_or_empty(&leg.address),
            latitude: 0.0,
            longitude: 0.0,
            airport_id: None,
            airport_name: String::new(),
            airline_id: None,
            airline_name: String::new(),
            flight_number: String::new(),
            cruise_port: String::new(),
            cruise_ship: String::new(),
        };

        match kind {
            LegKind::Address => {}
            LegKind::Airport => {
                if let Some((airport, how)) =
                    resolve_airport(leg.airport_name.as_deref(), self.lookups)
                {
                    if how.is_resolved() {
                        coordinate = airport.coordinate.or(coordinate);
                    } else {
                        warnings.push(PayloadWarning::UnresolvedLookup {
                            field: side.airport_field(),
                            display_name: airport.name.clone(),
                        });
                    }
                    if payload.address.is_empty() {
                        payload.address = airport.name.clone();
                    }
                    payload.airport_id = airport.id;
                    payload.airport_name = airport.name;
                }
                if let Some((airline, how)) =
                    resolve_airline(leg.airline_name.as_deref(), self.lookups)
                {
                    if !how.is_resolved() {
                        warnings.push(PayloadWarning::UnresolvedLookup {
                            field: side.airline_field(),
                            display_name: airline.name.clone(),
                        });
                    }
                    payload.airline_id = airline.id;
                    payload.airline_name = airline.name;
                }
                payload.flight_number = text_or_empty(&leg.flight_number);
            }
            LegKind::CruisePort => {
                payload.cruise_port = text_or_empty(&leg.cruise_port);
                payload.cruise_ship = text_or_empty(&leg.cruise_ship);
                if payload.address.is_empty() {
                    payload.address = payload.cruise_port.clone();
                }
            }
        }

        if let Some(coordinate) = coordinate {
            payload.latitude = coordinate.lat;
            payload.longitude = coordinate.lon;
        }
        payload
    }
}

fn resolve_service_type(
    snapshot: &BookingSnapshot,
    edits: &UserEditSet,
    warnings: &mut Vec<PayloadWarning>,
) -> ServiceType {
    let label = edits
        .service_type
        .as_deref()
        .or(snapshot.service_type.as_deref())
        .unwrap_or_default();
    ServiceType::from_label(label).unwrap_or_else(|| {
        if !label.trim().is_empty() {
            warnings.push(PayloadWarning::UnrecognizedLabel {
                field: "service_type",
                label: label.to_string(),
            });
        }
        ServiceType::OneWay
    })
}

fn resolve_transfer_type(
    snapshot: &BookingSnapshot,
    edits: &UserEditSet,
    warnings: &mut Vec<PayloadWarning>,
) -> TransferType {
    for label in [edits.transfer_type.as_deref(), snapshot.transfer_type.as_deref()]
        .into_iter()
        .flatten()
        .filter(|label| !label.trim().is_empty())
    {
        match TransferType::from_label(label) {
            Some(transfer) => return transfer,
            None => warnings.push(PayloadWarning::UnrecognizedLabel {
                field: "transfer_type",
                label: label.to_string(),
            }),
        }
    }
    DEFAULT_TRANSFER_TYPE
}

/// User stops replace the snapshot's when supplied; blank addresses are dropped.
fn merge_extra_stops(original: &[ExtraStop], edited: Option<&[ExtraStop]>) -> Vec<ExtraStopPayload> {
    edited
        .unwrap_or(original)
        .iter()
        .filter(|stop| !stop.address.trim().is_empty())
        .map(|stop| ExtraStopPayload {
            address: stop.address.trim().to_string(),
            latitude: stop.coordinate.map_or(0.0, |c| c.lat),
            longitude: stop.coordinate.map_or(0.0, |c| c.lon),
            rate: stop.rate.unwrap_or(0.0),
            instructions: text_or_empty(&stop.instructions),
        })
        .collect()
}

fn rate_payload(
    snapshot: &BookingSnapshot,
    input: &RateComputationInput,
    computed: &RateComputationResult,
) -> RatePayload {
    let schedule = &snapshot.rates;
    let shares = &computed.shares;
    RatePayload {
        all_inclusive_rates: rate_lines(&schedule.all_inclusive_rates, input, false),
        taxes: rate_lines(&schedule.taxes, input, true),
        amenities: rate_lines(&schedule.amenities, input, false),
        misc: rate_lines(&schedule.misc, input, false),
        base_rate: computed.base_rate,
        sub_total: computed.sub_total,
        grand_total: computed.grand_total,
        admin_share_percentage: computed.admin_share_percentage,
        admin_share: shares.admin_share,
        deducted_admin_share: shares.deducted_admin_share,
        affiliate_share: shares.affiliate_share,
        stripe_fee: shares.stripe_fee,
        extra_gratuity_share: shares.extra_gratuity_share,
        travel_agent_share: shares.travel_agent_share.unwrap_or(0.0),
        farmout_share: shares.farmout_share.unwrap_or(0.0),
    }
}

fn rate_lines(
    group: &RateGroup,
    input: &RateComputationInput,
    percent_capable: bool,
) -> indexmap::IndexMap<String, RateLinePayload> {
    group
        .iter()
        .map(|(key, item)| {
            let line = RateLinePayload {
                label: item.label.clone(),
                base_rate: effective_rate(key, item, input),
                multiple: item.multiple,
                percentage: item.percentage,
                amount: item.amount,
                rate_type: item.rate_type.clone(),
                is_percent: percent_capable
                    && input.tax_is_percent.get(key).copied().unwrap_or(false),
            };
            (key.clone(), line)
        })
        .collect()
}

fn pick_text(edit: &Option<String>, base: &Option<String>) -> String {
    edit.as_deref()
        .or(base.as_deref())
        .map(str::trim)
        .unwrap_or_default()
        .to_string()
}

fn text_or_empty(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}
