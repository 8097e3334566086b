use nalgebra::{Matrix4, MatrixXx4};

use crate::{error::Error, navigation::Linearization};

/// [DilutionOfPrecision] of the satellite geometry,
/// obtained from the pseudo range rows of the [Linearization].
#[derive(Debug, Clone, Default, Copy, PartialEq)]
pub struct DilutionOfPrecision {
    /// Geometric DOP
    pub gdop: f64,

    /// Position DOP
    pub pdop: f64,

    /// Temporal DOP
    pub tdop: f64,
}

impl DilutionOfPrecision {
    /// Creates new [DilutionOfPrecision] from the line of sight vectors:
    /// Q = (GᵀG)⁻¹ where each row of G is [a_i, 1].
    pub fn new(linearization: &Linearization) -> Result<Self, Error> {
        let n = linearization.len();
        let mut g = MatrixXx4::<f64>::zeros(n);

        for (i, a_i) in linearization.line_of_sight.iter().enumerate() {
            g[(i, 0)] = a_i[0];
            g[(i, 1)] = a_i[1];
            g[(i, 2)] = a_i[2];
            g[(i, 3)] = 1.0;
        }

        let q: Matrix4<f64> = (g.transpose() * g)
            .try_inverse()
            .ok_or(Error::MatrixInversion)?;

        Ok(Self {
            gdop: q.trace().sqrt(),
            pdop: (q[(0, 0)] + q[(1, 1)] + q[(2, 2)]).sqrt(),
            tdop: q[(3, 3)].sqrt(),
        })
    }
}
