//! Composition balancing for lipid-bearing feedstock streams.
//!
//! The balancer retargets a stream's dry-weight lipid fraction using a fixed
//! empirical allocation rule: water and ash are set to fixed fractions of the
//! reference total mass, the carbohydrate and fiber groups share the
//! remaining solids in the split recorded at calibration time, and the lipid
//! amount closes the dry-weight balance so the resulting fraction equals the
//! target exactly.
//!
//! Calibration is a separate, explicit step: [`CompositionRatios::derive`]
//! reads the split ratios and the energy-content gap off a stream once, and
//! the record is then passed to every balancing call. Reusing one record
//! across repeated calls makes them exactly idempotent.
//!
//! # Example
//!
//! ```
//! use oleocane::{reference_feedstock, CompositionRatios};
//!
//! let feed = reference_feedstock();
//! let ratios = CompositionRatios::derive(&feed)?;
//!
//! // The carbohydrate/fiber split is a partition of the combined solids.
//! assert!((ratios.r_mass_carbs + ratios.r_mass_fiber - 1.0).abs() < 1e-12);
//! // Lipid is more energy dense than the sugars it displaces.
//! assert!(ratios.lhv_lipid_over_carbs > 0.0);
//! # Ok::<(), oleocane::CompositionError>(())
//! ```

use crate::{Component, Stream};

/// The lipid component group.
pub const LIPID_GROUP: [Component; 1] = [Component::Lipid];

/// The carbohydrate (sugar) component group.
pub const CARB_GROUP: [Component; 2] = [Component::Glucose, Component::Sucrose];

/// The fiber (lignocellulose) component group.
pub const FIBER_GROUP: [Component; 3] =
    [Component::Lignin, Component::Cellulose, Component::Hemicellulose];

/// Water mass fraction of the total stream, fixed by the feedstock model.
const Z_MASS_WATER: f64 = 0.70;

/// Ash mass fraction of the total stream.
const Z_MASS_ASH: f64 = 0.05;

/// Lipid correction slope of the empirical dry-solids model.
const LIPID_DRY_SLOPE: f64 = 0.0886;

/// Solids correction factor drawn from the ash/water split.
const SOLIDS_CORRECTION: f64 = 1.05 / 0.95;

/// Result type for composition operations.
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Errors that can occur while deriving ratios or balancing a stream.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompositionError {
    /// The allocation rule produced a negative or non-finite component mass
    /// for the requested lipid fraction.
    #[error("{:.1}% dry weight is infeasible", .lipid_fraction * 100.0)]
    InfeasibleComposition {
        /// The requested dry-weight lipid fraction
        lipid_fraction: f64,
    },
    /// The stream holds no dry mass, so a dry-weight fraction is undefined.
    #[error("stream has no dry mass")]
    ZeroDryMass,
    /// A component group holds no mass, so its ratios are undefined.
    #[error("{group} group holds no mass, composition ratios are undefined")]
    EmptyComponentGroup {
        /// Name of the empty group
        group: &'static str,
    },
}

/// Calibration record derived from a reference stream.
///
/// Holds the four scalars the balancing rule needs, so repeated invocations
/// reuse them without recomputation. The record is immutable: balancing never
/// alters it, and re-deriving from a stream is the only way to obtain new
/// values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompositionRatios {
    /// Mass-specific energy-content gap between the lipid group and the
    /// carbohydrate group [MJ/kg]: lipid LHV per unit lipid mass minus
    /// carbohydrate LHV per unit carbohydrate mass. The lumped conversion
    /// factor behind the dry-solids model's lipid correction.
    pub lhv_lipid_over_carbs: f64,
    /// Carbohydrate-group share of the combined carbohydrate + fiber mass.
    pub r_mass_carbs: f64,
    /// Fiber-group share of the combined carbohydrate + fiber mass.
    pub r_mass_fiber: f64,
    /// Reference total mass [kg/h] recorded at derivation time. All
    /// balancing arithmetic is anchored to this mass, not to the stream's
    /// current total.
    pub f_mass: f64,
}

impl CompositionRatios {
    /// Derives the calibration record from a stream's current composition.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::EmptyComponentGroup`] when the lipid or
    /// carbohydrate group holds no mass (the per-mass ratios would be
    /// undefined divisions).
    pub fn derive(stream: &Stream) -> CompositionResult<Self> {
        let lipid_mass = stream.group_mass(&LIPID_GROUP);
        let carbs_mass = stream.group_mass(&CARB_GROUP);
        let fiber_mass = stream.group_mass(&FIBER_GROUP);

        if lipid_mass <= 0.0 {
            return Err(CompositionError::EmptyComponentGroup { group: "lipid" });
        }
        if carbs_mass <= 0.0 {
            return Err(CompositionError::EmptyComponentGroup { group: "carbohydrate" });
        }

        let lhv_lipid = stream.heat_of_combustion(&LIPID_GROUP) / lipid_mass;
        let lhv_carbs = stream.heat_of_combustion(&CARB_GROUP) / carbs_mass;
        let solids_mass = carbs_mass + fiber_mass;

        Ok(CompositionRatios {
            lhv_lipid_over_carbs: lhv_lipid - lhv_carbs,
            r_mass_carbs: carbs_mass / solids_mass,
            r_mass_fiber: fiber_mass / solids_mass,
            f_mass: stream.total_mass(),
        })
    }
}

/// Sets the dry-weight lipid fraction of a stream.
///
/// Recomputes the masses of lipid, carbohydrate, fiber, water, and ash from
/// the calibration record so the stream's dry-weight lipid fraction equals
/// `lipid_fraction`:
///
/// - water and ash are overwritten with fixed empirical fractions of the
///   recorded reference mass,
/// - the carbohydrate and fiber groups share the remaining solids per the
///   empirical dry-solids model and the recorded split ratios, each group
///   distributed over its sub-components in their pre-existing internal
///   proportions,
/// - the lipid mass closes the dry-weight balance.
///
/// Only the dry-solids apportionment follows the recorded split; the total
/// mass is not exactly conserved, by design of the fixed water/ash model.
///
/// All masses are staged and validated before any of them is committed, so a
/// failed call leaves the stream untouched.
///
/// # Errors
///
/// Returns [`CompositionError::InfeasibleComposition`] when the allocation
/// rule yields a negative or non-finite mass for any component. A target
/// outside `[0, 1)` is not rejected up front; it surfaces as this same
/// infeasibility once the derived masses degenerate.
pub fn set_lipid_fraction(
    lipid_fraction: f64,
    stream: &mut Stream,
    ratios: &CompositionRatios,
) -> CompositionResult<()> {
    let z_mass_lipid = lipid_fraction;
    let f_mass = ratios.f_mass;

    // Empirical dry-solids model: the carbohydrate + fiber share of the
    // solids once water, ash, and lipid are accounted for.
    let z_dry = (1.0 - Z_MASS_WATER - z_mass_lipid * LIPID_DRY_SLOPE) * SOLIDS_CORRECTION;

    let water = Z_MASS_WATER * f_mass;
    let ash = Z_MASS_ASH * f_mass;
    let solids = f_mass - water - ash;

    let carbs = z_dry * ratios.r_mass_carbs * solids;
    let fiber = z_dry * ratios.r_mass_fiber * solids;
    // Lipid closes the dry-weight balance:
    // lipid / (ash + carbs + fiber + lipid) == z_mass_lipid.
    let lipid = z_mass_lipid / (1.0 - z_mass_lipid) * (ash + carbs + fiber);

    let carb_shares = internal_proportions(stream, &CARB_GROUP);
    let fiber_shares = internal_proportions(stream, &FIBER_GROUP);

    let staged = [
        (Component::Water, water),
        (Component::Ash, ash),
        (Component::Lipid, lipid),
        (Component::Glucose, carbs * carb_shares[0]),
        (Component::Sucrose, carbs * carb_shares[1]),
        (Component::Lignin, fiber * fiber_shares[0]),
        (Component::Cellulose, fiber * fiber_shares[1]),
        (Component::Hemicellulose, fiber * fiber_shares[2]),
    ];

    if staged.iter().any(|&(_, mass)| mass < 0.0 || !mass.is_finite()) {
        return Err(CompositionError::InfeasibleComposition { lipid_fraction });
    }

    for (component, mass) in staged {
        stream.set_mass(component, mass);
    }
    Ok(())
}

/// Gets the dry-weight lipid fraction currently present in a stream.
///
/// # Errors
///
/// Returns [`CompositionError::ZeroDryMass`] when the stream holds no dry
/// mass.
pub fn get_lipid_fraction(stream: &Stream) -> CompositionResult<f64> {
    let dry_mass = stream.total_dry_mass();
    if dry_mass <= 0.0 {
        return Err(CompositionError::ZeroDryMass);
    }
    Ok(stream.mass(Component::Lipid) / dry_mass)
}

/// Current internal proportions of a component group, or an even split when
/// the group holds no mass.
fn internal_proportions<const N: usize>(stream: &Stream, group: &[Component; N]) -> [f64; N] {
    let total = stream.group_mass(group);
    if total > 0.0 {
        group.map(|component| stream.mass(component) / total)
    } else {
        [1.0 / N as f64; N]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_feedstock;

    fn calibrated_feed() -> (Stream, CompositionRatios) {
        let feed = reference_feedstock();
        let ratios = CompositionRatios::derive(&feed).unwrap();
        (feed, ratios)
    }

    #[test]
    fn test_derived_ratios() {
        let (feed, ratios) = calibrated_feed();

        assert!((ratios.r_mass_carbs + ratios.r_mass_fiber - 1.0).abs() < 1e-12);
        assert!((ratios.r_mass_carbs - 0.4538603).abs() < 1e-6);
        assert!((ratios.lhv_lipid_over_carbs - 22.0708).abs() < 1e-3);
        assert_eq!(ratios.f_mass, feed.total_mass());
    }

    #[test]
    fn test_round_trip() {
        let (mut feed, ratios) = calibrated_feed();
        set_lipid_fraction(0.05, &mut feed, &ratios).unwrap();
        assert!((get_lipid_fraction(&feed).unwrap() - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_round_trip_across_targets() {
        for target in [0.0, 0.02, 0.10, 0.25, 0.60] {
            let (mut feed, ratios) = calibrated_feed();
            set_lipid_fraction(target, &mut feed, &ratios).unwrap();
            assert!((get_lipid_fraction(&feed).unwrap() - target).abs() < 1e-9);
        }
    }

    #[test]
    fn test_carbs_fiber_split_follows_record() {
        let (mut feed, ratios) = calibrated_feed();
        set_lipid_fraction(0.05, &mut feed, &ratios).unwrap();

        let carbs = feed.group_mass(&CARB_GROUP);
        let fiber = feed.group_mass(&FIBER_GROUP);
        assert!((carbs / fiber - ratios.r_mass_carbs / ratios.r_mass_fiber).abs() < 1e-9);
    }

    #[test]
    fn test_within_group_proportions_preserved() {
        let (mut feed, ratios) = calibrated_feed();
        let glucose_share =
            feed.mass(Component::Glucose) / feed.group_mass(&CARB_GROUP);
        let lignin_share = feed.mass(Component::Lignin) / feed.group_mass(&FIBER_GROUP);

        set_lipid_fraction(0.12, &mut feed, &ratios).unwrap();

        let glucose_share_after =
            feed.mass(Component::Glucose) / feed.group_mass(&CARB_GROUP);
        let lignin_share_after =
            feed.mass(Component::Lignin) / feed.group_mass(&FIBER_GROUP);
        assert!((glucose_share_after - glucose_share).abs() < 1e-12);
        assert!((lignin_share_after - lignin_share).abs() < 1e-12);
    }

    #[test]
    fn test_water_and_ash_overwritten_from_reference_mass() {
        let (mut feed, ratios) = calibrated_feed();
        set_lipid_fraction(0.05, &mut feed, &ratios).unwrap();

        assert!((feed.mass(Component::Water) - 0.70 * ratios.f_mass).abs() < 1e-9);
        assert!((feed.mass(Component::Ash) - 0.05 * ratios.f_mass).abs() < 1e-9);
    }

    #[test]
    fn test_repeated_balancing_is_idempotent() {
        let (mut once, ratios) = calibrated_feed();
        set_lipid_fraction(0.10, &mut once, &ratios).unwrap();

        let mut twice = reference_feedstock();
        set_lipid_fraction(0.10, &mut twice, &ratios).unwrap();
        set_lipid_fraction(0.10, &mut twice, &ratios).unwrap();

        for component in Component::ALL {
            assert!((once.mass(component) - twice.mass(component)).abs() < 1e-6);
        }
    }

    #[test]
    fn test_record_outlives_stream_mutation() {
        let (mut feed, ratios) = calibrated_feed();
        let before = ratios;

        // Balancing changes the stream's raw composition, not the record.
        set_lipid_fraction(0.10, &mut feed, &ratios).unwrap();
        assert_eq!(ratios, before);

        // A later call still anchors water to the recorded reference mass.
        set_lipid_fraction(0.05, &mut feed, &ratios).unwrap();
        assert!((feed.mass(Component::Water) - 0.70 * before.f_mass).abs() < 1e-9);
    }

    #[test]
    fn test_full_lipid_target_is_infeasible() {
        let (mut feed, ratios) = calibrated_feed();
        let err = set_lipid_fraction(1.0, &mut feed, &ratios).unwrap_err();

        assert_eq!(err, CompositionError::InfeasibleComposition { lipid_fraction: 1.0 });
        assert_eq!(err.to_string(), "100.0% dry weight is infeasible");
    }

    #[test]
    fn test_negative_target_is_infeasible() {
        let (mut feed, ratios) = calibrated_feed();
        let err = set_lipid_fraction(-0.25, &mut feed, &ratios).unwrap_err();
        assert_eq!(err.to_string(), "-25.0% dry weight is infeasible");
    }

    #[test]
    fn test_failed_balance_leaves_stream_untouched() {
        let (mut feed, ratios) = calibrated_feed();
        assert!(set_lipid_fraction(1.0, &mut feed, &ratios).is_err());
        assert_eq!(feed, reference_feedstock());
    }

    #[test]
    fn test_accessor_guards_zero_dry_mass() {
        let mut stream = Stream::new("wet");
        stream.set_mass(Component::Water, 100.0);
        assert_eq!(get_lipid_fraction(&stream), Err(CompositionError::ZeroDryMass));

        let empty = Stream::new("empty");
        assert_eq!(get_lipid_fraction(&empty), Err(CompositionError::ZeroDryMass));
    }

    #[test]
    fn test_derive_rejects_empty_groups() {
        let mut no_lipid = Stream::new("no_lipid");
        no_lipid.set_mass(Component::Water, 70.0);
        no_lipid.set_mass(Component::Sucrose, 30.0);
        assert_eq!(
            CompositionRatios::derive(&no_lipid),
            Err(CompositionError::EmptyComponentGroup { group: "lipid" })
        );

        let mut no_carbs = Stream::new("no_carbs");
        no_carbs.set_mass(Component::Water, 70.0);
        no_carbs.set_mass(Component::Lipid, 30.0);
        assert_eq!(
            CompositionRatios::derive(&no_carbs),
            Err(CompositionError::EmptyComponentGroup { group: "carbohydrate" })
        );
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::reference_feedstock;

    #[test]
    fn test_ratios_json_round_trip() {
        let ratios = CompositionRatios::derive(&reference_feedstock()).unwrap();
        let json = serde_json::to_string(&ratios).unwrap();
        let back: CompositionRatios = serde_json::from_str(&json).unwrap();
        assert_eq!(ratios, back);
    }

    #[test]
    fn test_stream_json_round_trip() {
        let feed = reference_feedstock();
        let json = serde_json::to_string(&feed).unwrap();
        let back: Stream = serde_json::from_str(&json).unwrap();
        assert_eq!(feed, back);
    }
}
