//! Distribution of the two-sided one-sample Kolmogorov statistic D_n.
//!
//! Exact evaluation follows Marsaglia, Tsang & Wang (2003), "Evaluating
//! Kolmogorov's distribution", J. Stat. Software 8(18). For large n*d^2 the
//! paper's closed-form approximation is used instead of the matrix power.

const SCALE: f64 = 1e140;
const SCALE_EXP: i32 = 140;

/// P(D_n < d).
pub fn kolmogorov_cdf(n: usize, d: f64) -> f64 {
    if n == 0 || d <= 0.0 {
        return 0.0;
    }
    if d >= 1.0 {
        return 1.0;
    }
    let nf = n as f64;
    let s = d * d * nf;
    if s > 7.24 || (s > 3.76 && n > 99) {
        let p = 1.0 - 2.0 * (-(2.000071 + 0.331 / nf.sqrt() + 1.409 / nf) * s).exp();
        return p.clamp(0.0, 1.0);
    }

    let k = (nf * d) as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nf * d;

    let mut hm = Matrix::zeros(m);
    for i in 0..m {
        for j in 0..m {
            if i + 1 >= j {
                hm.set(i, j, 1.0);
            }
        }
    }
    for i in 0..m {
        let v = hm.get(i, 0) - h.powi(i as i32 + 1);
        hm.set(i, 0, v);
        let v = hm.get(m - 1, i) - h.powi((m - i) as i32);
        hm.set(m - 1, i, v);
    }
    if 2.0 * h - 1.0 > 0.0 {
        let v = hm.get(m - 1, 0) + (2.0 * h - 1.0).powi(m as i32);
        hm.set(m - 1, 0, v);
    }
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                let mut v = hm.get(i, j);
                for g in 1..=(i + 1 - j) {
                    v /= g as f64;
                }
                hm.set(i, j, v);
            }
        }
    }

    let (q, mut exp10) = power(&hm, n);
    let mut s = q.get(k - 1, k - 1);
    for i in 1..=n {
        s = s * i as f64 / nf;
        if s < 1.0 / SCALE {
            s *= SCALE;
            exp10 -= SCALE_EXP;
        }
    }
    (s * 10f64.powi(exp10)).clamp(0.0, 1.0)
}

/// P(D_n >= d).
pub fn kolmogorov_sf(n: usize, d: f64) -> f64 {
    (1.0 - kolmogorov_cdf(n, d)).clamp(0.0, 1.0)
}

#[derive(Clone)]
struct Matrix {
    m: usize,
    data: Vec<f64>,
}

impl Matrix {
    fn zeros(m: usize) -> Self {
        Self {
            m,
            data: vec![0.0; m * m],
        }
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.m + j]
    }

    fn set(&mut self, i: usize, j: usize, v: f64) {
        self.data[i * self.m + j] = v;
    }

    fn mul(&self, other: &Matrix) -> Matrix {
        let m = self.m;
        let mut out = Matrix::zeros(m);
        for i in 0..m {
            for l in 0..m {
                let a = self.get(i, l);
                if a == 0.0 {
                    continue;
                }
                for j in 0..m {
                    out.data[i * m + j] += a * other.data[l * m + j];
                }
            }
        }
        out
    }

    fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }
}

// Returns (A^e, base-10 exponent carried out of the entries).
fn power(a: &Matrix, e: usize) -> (Matrix, i32) {
    if e == 1 {
        return (a.clone(), 0);
    }
    let (half, half_exp) = power(a, e / 2);
    let mut out = half.mul(&half);
    let mut exp10 = 2 * half_exp;
    if e % 2 == 1 {
        out = a.mul(&out);
    }
    let centre = out.m / 2;
    if out.get(centre, centre) > SCALE {
        out.scale(1.0 / SCALE);
        exp10 += SCALE_EXP;
    }
    (out, exp10)
}
