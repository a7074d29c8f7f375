//! # Oleocane: Feedstock Composition Balancing
//!
//! A typed model of a lipid-bearing feedstock stream (an oil-cane style
//! mixture of lipid, sugars, and lignocellulosic fiber plus water and ash)
//! together with a composition balancer that retargets the stream's
//! dry-weight lipid fraction while preserving the energy-consistent split
//! between its carbohydrate and fiber sub-fractions.
//!
//! ## Example
//!
//! ```
//! use oleocane::{reference_feedstock, set_lipid_fraction, get_lipid_fraction};
//! use oleocane::CompositionRatios;
//!
//! // The reference feedstock assay (no hidden process-wide default:
//! // the stream is always passed explicitly).
//! let mut feed = reference_feedstock();
//!
//! // Derive the calibration record once, then balance to 5 % lipid
//! // on a dry-weight basis.
//! let ratios = CompositionRatios::derive(&feed)?;
//! set_lipid_fraction(0.05, &mut feed, &ratios)?;
//!
//! assert!((get_lipid_fraction(&feed)? - 0.05).abs() < 1e-9);
//! # Ok::<(), oleocane::CompositionError>(())
//! ```
//!
//! Infeasible targets fail without touching the stream:
//!
//! ```
//! use oleocane::{reference_feedstock, set_lipid_fraction, CompositionRatios};
//!
//! let mut feed = reference_feedstock();
//! let ratios = CompositionRatios::derive(&feed)?;
//!
//! let err = set_lipid_fraction(1.0, &mut feed, &ratios).unwrap_err();
//! assert_eq!(err.to_string(), "100.0% dry weight is infeasible");
//! assert_eq!(feed, reference_feedstock());
//! # Ok::<(), oleocane::CompositionError>(())
//! ```
//!
//! ## Optional Features
//!
//! - **`serde`**: `Serialize`/`Deserialize` for [`Component`], [`Stream`],
//!   and [`CompositionRatios`], so feedstock assays and derived calibration
//!   records can be persisted by callers.

pub mod composition;
pub mod feedstock;

pub use composition::{
    get_lipid_fraction, set_lipid_fraction, CompositionError, CompositionRatios,
    CompositionResult, CARB_GROUP, FIBER_GROUP, LIPID_GROUP,
};
pub use feedstock::reference_feedstock;

/// Chemical components tracked by a [`Stream`].
///
/// The taxonomy is fixed: a feedstock stream is water and ash plus three
/// dry-solid groups (lipid, carbohydrate, fiber). Each component carries a
/// fixed molar mass relating the mass and molar bases, and a fixed lower
/// heating value used for energy-weighted group properties.
///
/// # Examples
///
/// ```
/// use oleocane::Component;
///
/// assert_eq!(Component::Water.molar_mass(), 18.015);
/// assert_eq!(Component::Water.lhv(), 0.0);
/// assert!(Component::Lipid.lhv() > Component::Sucrose.lhv());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Component {
    /// Free water
    Water,
    /// Mineral ash and other inert solids
    Ash,
    /// Crude vegetable lipid (triolein basis)
    Lipid,
    /// Glucose
    Glucose,
    /// Sucrose
    Sucrose,
    /// Cellulose (anhydroglucose repeat unit basis)
    Cellulose,
    /// Hemicellulose (anhydroxylose repeat unit basis)
    Hemicellulose,
    /// Lignin (phenylpropanoid repeat unit basis)
    Lignin,
}

impl Component {
    /// Number of components in the taxonomy.
    pub const COUNT: usize = 8;

    /// All components, in storage order.
    pub const ALL: [Component; Component::COUNT] = [
        Component::Water,
        Component::Ash,
        Component::Lipid,
        Component::Glucose,
        Component::Sucrose,
        Component::Cellulose,
        Component::Hemicellulose,
        Component::Lignin,
    ];

    /// Molar mass [kg/kmol].
    ///
    /// Polymeric components are tracked on a repeat-unit basis; ash is
    /// tracked on an SiO2 basis.
    pub fn molar_mass(self) -> f64 {
        match self {
            Component::Water => 18.015,
            Component::Ash => 60.084,
            Component::Lipid => 885.432,
            Component::Glucose => 180.156,
            Component::Sucrose => 342.297,
            Component::Cellulose => 162.141,
            Component::Hemicellulose => 132.116,
            Component::Lignin => 152.149,
        }
    }

    /// Lower heating value [MJ/kg] at 25 degC.
    ///
    /// Zero for the non-combustible components (water, ash).
    pub fn lhv(self) -> f64 {
        match self {
            Component::Water => 0.0,
            Component::Ash => 0.0,
            Component::Lipid => 37.10,
            Component::Glucose => 14.10,
            Component::Sucrose => 15.07,
            Component::Cellulose => 15.93,
            Component::Hemicellulose => 14.63,
            Component::Lignin => 21.20,
        }
    }

    /// Storage index of this component.
    fn index(self) -> usize {
        self as usize
    }
}

/// A named quantity of matter with per-component mass amounts.
///
/// Mass amounts are stored on a flow basis [kg/h]; molar amounts [kmol/h]
/// are derived through the fixed per-component molar masses. The component
/// set is the closed [`Component`] taxonomy, so there is no invalid-component
/// case to guard at runtime.
///
/// # Examples
///
/// ```
/// use oleocane::{Component, Stream};
///
/// let mut stream = Stream::new("feed");
/// stream.set_mass(Component::Water, 70.0);
/// stream.set_mass(Component::Sucrose, 30.0);
///
/// assert_eq!(stream.total_mass(), 100.0);
/// assert_eq!(stream.total_dry_mass(), 30.0);
///
/// // Molar basis is derived through the fixed molar mass.
/// stream.set_mol(Component::Water, 2.0);
/// assert_eq!(stream.mass(Component::Water), 2.0 * 18.015);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stream {
    /// Stream name or identifier
    name: String,
    /// Component mass amounts [kg/h], indexed in `Component::ALL` order
    mass: [f64; Component::COUNT],
}

impl Stream {
    /// Creates a new empty stream.
    pub fn new(name: &str) -> Self {
        Stream { name: name.to_string(), mass: [0.0; Component::COUNT] }
    }

    /// Gets the stream name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Gets the mass amount of a component [kg/h].
    pub fn mass(&self, component: Component) -> f64 {
        self.mass[component.index()]
    }

    /// Sets the mass amount of a component [kg/h].
    pub fn set_mass(&mut self, component: Component, mass: f64) {
        self.mass[component.index()] = mass;
    }

    /// Gets the molar amount of a component [kmol/h].
    pub fn mol(&self, component: Component) -> f64 {
        self.mass(component) / component.molar_mass()
    }

    /// Sets the molar amount of a component [kmol/h].
    pub fn set_mol(&mut self, component: Component, mol: f64) {
        self.set_mass(component, mol * component.molar_mass());
    }

    /// Total mass of the stream [kg/h].
    pub fn total_mass(&self) -> f64 {
        self.mass.iter().sum()
    }

    /// Total mass excluding water [kg/h].
    pub fn total_dry_mass(&self) -> f64 {
        self.total_mass() - self.mass(Component::Water)
    }

    /// Combined mass of a sub-selection of components [kg/h].
    pub fn group_mass(&self, group: &[Component]) -> f64 {
        group.iter().map(|&c| self.mass(c)).sum()
    }

    /// Heat of combustion of a sub-selection of components [MJ/h].
    ///
    /// The extensive lower heating value of the subset at its current
    /// composition: the mass-weighted sum of the per-component LHVs.
    pub fn heat_of_combustion(&self, group: &[Component]) -> f64 {
        group.iter().map(|&c| self.mass(c) * c.lhv()).sum()
    }
}
