//! Reference feedstock assay.

use crate::{Component, Stream};

/// The reference lipid-bearing cane feedstock.
///
/// A fixed baseline assay on a wet basis: roughly 70 wt % water,
/// sucrose-dominated sugars, lignocellulosic fiber, a small ash fraction,
/// and about 8.2 % lipid on a dry-weight basis. Callers that used to rely
/// on a process-wide default stream construct one here instead and pass it
/// explicitly.
///
/// # Examples
///
/// ```
/// use oleocane::{reference_feedstock, get_lipid_fraction};
///
/// let feed = reference_feedstock();
/// let baseline = get_lipid_fraction(&feed)?;
/// assert!(baseline > 0.08 && baseline < 0.09);
/// # Ok::<(), oleocane::CompositionError>(())
/// ```
pub fn reference_feedstock() -> Stream {
    let mut feed = Stream::new("oleocane");
    feed.set_mass(Component::Water, 234157.798);
    feed.set_mass(Component::Ash, 7017.709);
    feed.set_mass(Component::Lipid, 10035.334);
    feed.set_mass(Component::Glucose, 2007.067);
    feed.set_mass(Component::Sucrose, 45668.2);
    feed.set_mass(Component::Cellulose, 26986.69);
    feed.set_mass(Component::Hemicellulose, 15922.734);
    feed.set_mass(Component::Lignin, 14459.241);
    feed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::get_lipid_fraction;

    #[test]
    fn test_reference_totals() {
        let feed = reference_feedstock();
        assert!((feed.total_mass() - 356254.773).abs() < 1e-6);
        assert!((feed.total_dry_mass() - 122096.975).abs() < 1e-6);
    }

    #[test]
    fn test_baseline_lipid_fraction() {
        // Regression fixture for the unmodified reference assay.
        let feed = reference_feedstock();
        assert!((get_lipid_fraction(&feed).unwrap() - 0.0821915).abs() < 1e-6);
    }

    #[test]
    fn test_water_dominates_wet_basis() {
        let feed = reference_feedstock();
        let z_water = feed.mass(Component::Water) / feed.total_mass();
        assert!(z_water > 0.64 && z_water < 0.68);
    }
}
