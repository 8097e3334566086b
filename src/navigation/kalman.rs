use log::trace;
use nalgebra::{DMatrix, DVector};

use crate::{
    constants::{CLOCK_BIAS_INDEX, CLOCK_DRIFT_INDEX},
    error::Error,
    navigation::{Gain, Matrix8, ObservationMatrix, State, Vector8},
};

/// Eigenvalues of the covariance may not go below -tolerance x ‖P⁻‖.
const PSD_TOLERANCE: f64 = 1.0E-12;

/// [KfEstimate] is the filter state handed over from one epoch to the next.
#[derive(Debug, Clone, PartialEq)]
pub struct KfEstimate {
    /// Sample counter of the epoch that produced this estimate
    pub sample_counter: u64,
    /// Receiver [State]
    pub state: State,
    /// P Matrix, expressed in measurement domain (clock terms in m and m.s⁻¹)
    pub p: Matrix8,
}

impl KfEstimate {
    /// Create new [KfEstimate]
    pub fn new(sample_counter: u64, state: State, p: Matrix8) -> Self {
        Self {
            sample_counter,
            state,
            p,
        }
    }

    /// True if this [KfEstimate] may be used to initialize the filter
    pub fn is_valid(&self) -> bool {
        self.state.is_finite() && self.p.iter().all(|p| p.is_finite())
    }
}

/// Outcome of the [Kalman] measurement update
#[derive(Debug, Clone)]
pub(crate) struct Correction {
    /// Corrected x vector
    pub x: Vector8,
    /// Corrected P matrix
    pub p: Matrix8,
    /// K gain
    pub k: Gain,
    /// dx = K * y
    pub dx: Vector8,
}

/// Linear [Kalman] filter with constant velocity and constant
/// clock drift dynamics.
#[derive(Debug, Clone)]
pub(crate) struct Kalman {
    /// F transition matrix
    f_k: Matrix8,
}

impl Kalman {
    /// Builds a new [Kalman] filter for given time step (s)
    pub fn new(dt_s: f64) -> Self {
        Self {
            f_k: Self::transition(dt_s),
        }
    }

    /// F matrix: position integrates velocity, clock offset integrates clock drift.
    pub fn transition(dt_s: f64) -> Matrix8 {
        let mut f_k = Matrix8::identity();
        for i in 0..3 {
            f_k[(i, i + 3)] = dt_s;
        }
        f_k[(CLOCK_BIAS_INDEX, CLOCK_DRIFT_INDEX)] = dt_s;
        f_k
    }

    /// Q matrix, from the process noise variances
    pub fn process_noise(variances: &Vector8) -> Matrix8 {
        Matrix8::from_diagonal(variances)
    }

    /// Time update.
    /// ## Input
    /// - x: state vector
    /// - p: P covariance matrix
    /// - q: Q process noise matrix
    /// ## Returns
    /// - (x⁻, P⁻)
    pub fn predict(&self, x: &Vector8, p: &Matrix8, q: &Matrix8) -> (Vector8, Matrix8) {
        let x_k = self.f_k * x;
        let p_k = self.f_k * p * self.f_k.transpose() + q;
        (x_k, p_k)
    }

    /// Measurement update.
    /// ## Input
    /// - x: predicted state vector (measurement domain)
    /// - p: predicted P covariance matrix
    /// - h: H observation matrix (2N x 8)
    /// - r: R measurement noise matrix (2N x 2N)
    /// - y: residual vector (2N)
    pub fn correct(
        &self,
        x: &Vector8,
        p: &Matrix8,
        h: &ObservationMatrix,
        r: &DMatrix<f64>,
        y: &DVector<f64>,
    ) -> Result<Correction, Error> {
        let p_ht = p * h.transpose();

        let s = h * &p_ht + r;
        trace!("innovation covariance: {}", s);

        let s_inv = s
            .cholesky()
            .ok_or(Error::MatrixInversion)?
            .inverse();

        let k: Gain = p_ht * s_inv;
        let dx = &k * y;

        let x_k = x + dx;

        // Joseph form
        let i_kh = Matrix8::identity() - &k * h;
        let p_k = &i_kh * p * i_kh.transpose() + &k * r * k.transpose();

        let p_k = 0.5 * (p_k + p_k.transpose());

        if !x_k.iter().all(|x| x.is_finite()) {
            return Err(Error::NonFiniteState);
        }

        Self::check_covariance(&p_k, p.amax())?;

        Ok(Correction {
            x: x_k,
            p: p_k,
            k,
            dx,
        })
    }

    /// Verifies (symmetrized) P is finite and positive semi definite
    pub fn check_covariance(p: &Matrix8, scale: f64) -> Result<(), Error> {
        if !p.iter().all(|p| p.is_finite()) {
            return Err(Error::InvalidCovariance);
        }

        let tolerance = PSD_TOLERANCE * scale.max(1.0);

        let min_eigenvalue = p.symmetric_eigenvalues().min();

        if min_eigenvalue < -tolerance {
            return Err(Error::InvalidCovariance);
        }

        Ok(())
    }
}
