//! Reference planform data and the baseline leading/trailing-edge mesh.

use serde::Serialize;

/// One spanwise row of a reference planform table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanformStation {
    /// Dimensionless span fraction, 0 at the root and 1 at the tip.
    pub eta: f64,
    pub xle: f64,
    pub yle: f64,
    pub zle: f64,
    /// Local twist in degrees.
    pub twist: f64,
    pub chord: f64,
}

impl PlanformStation {
    #[must_use]
    pub const fn new(eta: f64, xle: f64, yle: f64, zle: f64, twist: f64, chord: f64) -> Self {
        Self {
            eta,
            xle,
            yle,
            zle,
            twist,
            chord,
        }
    }

    #[must_use]
    pub const fn leading_edge(&self) -> [f64; 3] {
        [self.xle, self.yle, self.zle]
    }

    /// Trailing edge at the same y/z, offset in x by the local chord.
    #[must_use]
    pub fn trailing_edge(&self) -> [f64; 3] {
        [self.xle + self.chord, self.yle, self.zle]
    }
}

/// Common Research Model wing, root to tip.
pub const CRM_STATIONS: [PlanformStation; 20] = [
    PlanformStation::new(0.0, 904.294, 0.0, 174.126, 6.7166, 536.181),
    PlanformStation::new(0.1, 989.505, 115.675, 175.722, 4.4402, 468.511),
    PlanformStation::new(0.15, 1032.133, 173.513, 176.834, 3.6063, 434.764),
    PlanformStation::new(0.2, 1076.030, 231.351, 177.912, 2.2419, 400.835),
    PlanformStation::new(0.25, 1120.128, 289.188, 177.912, 2.2419, 366.996),
    PlanformStation::new(0.3, 1164.153, 347.026, 178.886, 1.5252, 333.157),
    PlanformStation::new(0.35, 1208.203, 404.864, 180.359, 0.9379, 299.317),
    PlanformStation::new(0.4, 1252.246, 462.701, 182.289, 0.4285, 277.288),
    PlanformStation::new(0.45, 1296.289, 520.539, 184.904, -0.2621, 263.0),
    PlanformStation::new(0.5, 1340.329, 578.377, 188.389, -0.6782, 248.973),
    PlanformStation::new(0.55, 1384.375, 636.214, 192.736, -0.9436, 234.816),
    PlanformStation::new(0.6, 1428.416, 694.052, 197.689, -1.2067, 220.658),
    PlanformStation::new(0.65, 1472.458, 751.890, 203.294, -1.4526, 206.501),
    PlanformStation::new(0.7, 1516.504, 809.727, 209.794, -1.6350, 192.344),
    PlanformStation::new(0.75, 1560.544, 867.565, 217.084, -1.8158, 178.186),
    PlanformStation::new(0.8, 1604.576, 925.402, 225.188, -2.0301, 164.029),
    PlanformStation::new(0.85, 1648.616, 983.240, 234.082, -2.2772, 149.872),
    PlanformStation::new(0.9, 1692.659, 1041.078, 243.625, -2.5773, 135.714),
    PlanformStation::new(0.95, 1736.710, 1098.915, 253.691, -3.1248, 121.557),
    PlanformStation::new(1.0, 1780.737, 1156.753, 263.827, -3.75, 107.4),
];

/// Structured `(2, N, 3)` mesh: row 0 is the leading edge, row 1 the
/// trailing edge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceMesh {
    leading_edge: Vec<[f64; 3]>,
    trailing_edge: Vec<[f64; 3]>,
}

impl ReferenceMesh {
    /// Number of spanwise stations `N`.
    #[must_use]
    pub fn station_count(&self) -> usize {
        self.leading_edge.len()
    }

    /// Number of spanwise panels, `N - 1`.
    #[must_use]
    pub fn panel_count(&self) -> usize {
        self.station_count().saturating_sub(1)
    }

    #[must_use]
    pub fn shape(&self) -> [usize; 3] {
        [2, self.station_count(), 3]
    }

    #[must_use]
    pub fn leading_edge(&self) -> &[[f64; 3]] {
        &self.leading_edge
    }

    #[must_use]
    pub fn trailing_edge(&self) -> &[[f64; 3]] {
        &self.trailing_edge
    }

    /// Rows in chordwise order, leading edge first.
    #[must_use]
    pub fn rows(&self) -> [&[[f64; 3]]; 2] {
        [&self.leading_edge, &self.trailing_edge]
    }

    #[must_use]
    pub fn point(&self, row: usize, station: usize) -> Option<[f64; 3]> {
        let points = match row {
            0 => &self.leading_edge,
            1 => &self.trailing_edge,
            _ => return None,
        };
        points.get(station).copied()
    }
}

/// Builds the baseline mesh from a planform table.
///
/// The table must be non-empty and sorted by increasing `eta`; this is not
/// checked.
#[must_use]
pub fn build_reference_mesh(table: &[PlanformStation]) -> ReferenceMesh {
    ReferenceMesh {
        leading_edge: table.iter().map(PlanformStation::leading_edge).collect(),
        trailing_edge: table.iter().map(PlanformStation::trailing_edge).collect(),
    }
}

#[must_use]
pub fn crm_reference_mesh() -> ReferenceMesh {
    build_reference_mesh(&CRM_STATIONS)
}

/// Twist per station, e.g. to seed `twist_cp` from the reference table.
#[must_use]
pub fn twist_distribution(table: &[PlanformStation]) -> Vec<f64> {
    table.iter().map(|station| station.twist).collect()
}

#[must_use]
pub fn chord_distribution(table: &[PlanformStation]) -> Vec<f64> {
    table.iter().map(|station| station.chord).collect()
}
