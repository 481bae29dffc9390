//! Display text for the ETA and distance labels.

const METRES_PER_MILE: f64 = 1_609.344;
const FEET_PER_METRE: f64 = 3.280_84;

/// `"450 ft"` under a tenth of a mile, `"2.4 mi"` above.
pub fn format_distance(distance_m: f64) -> String {
    let distance_m = if distance_m.is_finite() {
        distance_m.max(0.0)
    } else {
        0.0
    };
    let miles = distance_m / METRES_PER_MILE;
    if miles < 0.1 {
        let feet = (distance_m * FEET_PER_METRE / 10.0).round() * 10.0;
        format!("{feet:.0} ft")
    } else {
        format!("{miles:.1} mi")
    }
}

/// Whole minutes, never below one: `"1 min"`, `"12 min"`, `"1 hr 5 min"`.
pub fn format_eta(duration_secs: f64) -> String {
    let secs = if duration_secs.is_finite() {
        duration_secs.max(0.0)
    } else {
        0.0
    };
    let minutes = ((secs / 60.0).ceil() as u64).max(1);
    match (minutes / 60, minutes % 60) {
        (0, m) => format!("{m} min"),
        (h, 0) => format!("{h} hr"),
        (h, m) => format!("{h} hr {m} min"),
    }
}
