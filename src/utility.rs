use crate::ThisOrThat;

#[allow(dead_code)]
pub(crate) mod dms {
    /// Degrees per quarter turn
    pub const QD: i32 = 90;
    /// Minutes per degree
    pub const DM: i32 = 60;
    /// Seconds per minute
    pub const MS: i32 = 60;
    /// Degrees per half turn
    pub const HD: i32 = 2 * QD;
    /// Degrees per turn
    pub const TD: i32 = 2 * HD;
    /// Seconds per degree
    pub const DS: i32 = DM * MS;
}

fn special_sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;

    let up = up - u;
    let vpp = vpp - v;

    let t = s.is_zero().ternary_lazy(||s, || -(up + vpp));

    (s, t)
}

/// Evaluate a polynomial
pub(crate) fn polyval(p: &[f64], x: f64) -> f64 {
    p
        .iter()
        .fold(0_f64, |acc, val| acc*x + val)
}

pub(crate) trait GeoMath {
    fn is_zero(&self) -> bool;
    fn eps_eq(&self, other: Self) -> bool;
    fn ang_normalize(&self) -> Self;
    fn ang_diff(&self, other: Self) -> Self;
    fn to_bearing(&self) -> Self;
    fn eatanhe(&self, es: Self) -> Self;
    fn remainder(&self, denom: Self) -> Self;
    fn taupf(&self, es: Self) -> Self;
    fn tauf(&self, es: Self) -> Self;
}

impl GeoMath for f64 {
    fn is_zero(&self) -> bool {
        self.abs() < f64::EPSILON
    }

    fn eps_eq(&self, other: f64) -> bool {
        (*self - other).abs() < f64::EPSILON
    }

    /// Reduces degrees to (-180, 180].
    fn ang_normalize(&self) -> f64 {
        let value = self.remainder(f64::from(dms::TD));
        let hd = f64::from(dms::HD);

        if value.abs().eps_eq(hd) {
            hd
        }
        else {
            value
        }
    }

    fn ang_diff(&self, other: f64) -> f64 {
        let td = f64::from(dms::TD);
        // Use remainder instead of AngNormalize, since we treat boundary cases
        // later taking account of the error
        let (diff, err) = special_sum((-*self).remainder(td), other % td);
        // This second sum can only change d if abs(d) < 128, so don't need to
        // apply remainder yet again.
        let (diff, err) = special_sum(diff.remainder(td), err);

        let hd = f64::from(dms::HD);
        // Fix the sign if d = -180, 0, 180.
        if diff.is_zero() || diff.abs().eps_eq(hd) {
            // If e == 0, take sign from y - x
            // else (e != 0, implies d = +/-180), d and e must have opposite signs
            let sign = if err.is_zero() { other - *self } else { -err };
            diff.copysign(sign)
        }
        else {
            diff
        }
    }

    /// Reduces degrees to [0, 360).
    fn to_bearing(&self) -> f64 {
        let td = f64::from(dms::TD);
        let value = self.rem_euclid(td);
        // rem_euclid of a tiny negative value rounds up to a full turn
        (value >= td).ternary(0., value)
    }

    fn eatanhe(&self, es: f64) -> f64 {
        if es.is_sign_positive() {
            es * (es * *self).atanh()
        } else {
            -es * (es * *self).atan()
        }
    }

    fn remainder(&self, denom: Self) -> Self {
        *self - (*self / denom).round() * denom
    }

    fn taupf(&self, es: f64) -> f64 {
        let tau1 = 1.0_f64.hypot(*self);
        let sig = (*self / tau1).eatanhe(es).sinh();

        1.0_f64.hypot(sig) * *self - sig * tau1
    }

    #[allow(clippy::similar_names)]
    fn tauf(&self, es: f64) -> f64 {
        let numit = 5;
        let tol = f64::EPSILON.sqrt() / 10.0;

        let e2m = 1.0 - es.powi(2);
        let mut tau = if self.abs() > 70.0 {
            self * 1_f64.eatanhe(es).exp()
        } else {
            self / e2m
        };

        let stol = tol * self.abs().max(1.0);
        for _ in 0..numit {
            let taupa = tau.taupf(es);
            let dtau = (self - taupa) * (1.0 + e2m * tau.powi(2))
                / (e2m * 1.0_f64.hypot(tau) * 1.0_f64.hypot(taupa));
            tau += dtau;
            if dtau.abs() < stol {
                break;
            }
        }
        tau
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn normalize_folds_half_turn_to_positive() {
        assert_abs_diff_eq!((-180_f64).ang_normalize(), 180.);
        assert_abs_diff_eq!(540_f64.ang_normalize(), 180.);
        assert_abs_diff_eq!(190_f64.ang_normalize(), -170.);
        assert_abs_diff_eq!((-725_f64).ang_normalize(), -5., epsilon = 1e-12);
    }

    #[test]
    fn diff_crosses_antimeridian() {
        assert_abs_diff_eq!(170_f64.ang_diff(-170.), 20., epsilon = 1e-12);
        assert_abs_diff_eq!((-170_f64).ang_diff(170.), -20., epsilon = 1e-12);
    }

    #[test]
    fn bearing_range() {
        assert_abs_diff_eq!((-90_f64).to_bearing(), 270.);
        assert_abs_diff_eq!((-0.0_f64).to_bearing(), 0.);
        assert_abs_diff_eq!(720_f64.to_bearing(), 0.);
        assert!((-1e-20_f64).to_bearing() < 360.);
    }

    #[test]
    fn tauf_inverts_taupf() {
        let es = (crate::constants::WGS84_F * (2. - crate::constants::WGS84_F)).sqrt();
        for tau in [-5.0, -0.3, 0., 0.7, 12.0] {
            assert_abs_diff_eq!(tau.taupf(es).tauf(es), tau, epsilon = 1e-12);
        }
    }

    #[test]
    fn polyval_horner() {
        // 2x^2 + 3x + 4 at x = 2
        assert_abs_diff_eq!(polyval(&[2., 3., 4.], 2.), 18.);
    }
}
