use std::collections::HashMap;
use std::fmt;

use approx;
use nalgebra::Point3;
use num_traits::ToPrimitive;
use periodic_table;

/// A struct storing a look-up of element symbols to give atomic numbers.
pub struct ElementMap<'a> {
    /// A [HashMap] from a symbol string to an atomic number.
    pub map: HashMap<&'a str, u32>,
}

impl Default for ElementMap<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementMap<'static> {
    /// Creates a new [`ElementMap`] for all elements in the periodic table.
    #[must_use]
    pub fn new() -> ElementMap<'static> {
        let map = periodic_table::periodic_table()
            .into_iter()
            .map(|element| (element.symbol, element.atomic_number))
            .collect::<HashMap<_, _>>();
        ElementMap { map }
    }
}

/// A struct representing an atom.
#[derive(Clone)]
pub struct Atom {
    /// The atomic number of the atom.
    pub atomic_number: u32,

    /// The atomic symbol of the atom.
    pub atomic_symbol: String,

    /// The position of the atom.
    pub coordinates: Point3<f64>,

    /// A threshold for approximate equality comparisons.
    pub threshold: f64,
}

impl Atom {
    /// Parses an atom line in an `xyz` file to construct an [`Atom`].
    ///
    /// # Arguments
    ///
    /// * `line` - A line in an `xyz` file containing an atomic symbol and
    ///     three Cartesian coordinates.
    /// * `emap` - A hash map between atomic symbols and atomic numbers.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The parsed [`Atom`] struct if the line has the correct format and names a known element,
    /// otherwise [`None`].
    #[must_use]
    pub fn from_xyz(line: &str, emap: &ElementMap, thresh: f64) -> Option<Atom> {
        let split: Vec<&str> = line.split_whitespace().collect();
        if split.len() != 4 {
            return None;
        };
        let coordinates = Point3::new(
            split.get(1)?.parse::<f64>().ok()?,
            split.get(2)?.parse::<f64>().ok()?,
            split.get(3)?.parse::<f64>().ok()?,
        );
        Atom::new_ordinary(split.first()?, coordinates, emap, thresh)
    }

    /// Creates an ordinary atom.
    ///
    /// # Arguments
    ///
    /// * `atomic_symbol` - The element symbol.
    /// * `coordinates` - The coordinates of the atom.
    /// * `emap` - A hash map between atomic symbols and atomic numbers.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The required atom, or `None` if the symbol is not a known element.
    #[must_use]
    pub fn new_ordinary(
        atomic_symbol: &str,
        coordinates: Point3<f64>,
        emap: &ElementMap,
        thresh: f64,
    ) -> Option<Atom> {
        let atomic_number = emap.map.get(atomic_symbol)?;
        Some(Atom {
            atomic_number: *atomic_number,
            atomic_symbol: atomic_symbol.to_string(),
            coordinates,
            threshold: thresh,
        })
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let precision = self
            .threshold
            .log10()
            .abs()
            .round()
            .to_usize()
            .ok_or(fmt::Error)?
            + 1;
        let length = (precision + precision.div_euclid(2)).max(6);
        write!(
            f,
            "{:>9} {:>3} {:+length$.precision$} {:+length$.precision$} {:+length$.precision$}",
            "Atom",
            self.atomic_symbol,
            self.coordinates[0],
            self.coordinates[1],
            self.coordinates[2],
        )
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl PartialEq for Atom {
    fn eq(&self, other: &Self) -> bool {
        let thresh = (self.threshold * other.threshold).sqrt();
        self.atomic_number == other.atomic_number
            && approx::relative_eq!(
                self.coordinates,
                other.coordinates,
                epsilon = thresh,
                max_relative = thresh,
            )
    }
}
