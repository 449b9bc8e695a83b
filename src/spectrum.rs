use num::complex::Complex64;
use realfft::RealFftPlanner;

use crate::util::Int;

// Half-complex layout of a length-L real signal: L/2 + 1 bins, where bin 0
// (DC) and, for even L, bin L/2 (Nyquist) carry no imaginary part. Every
// helper here preserves that invariant.
pub type Spectrum = Vec<Complex64>;

#[must_use]
pub fn forward(mut buf: Vec<f64>) -> Spectrum {
    let len = buf.len();
    if len == 1 {
        // the length-1 transform is the identity
        return vec![Complex64::new(buf[0], 0.0)];
    }
    let fft = RealFftPlanner::<f64>::new().plan_fft_forward(len);
    let mut spectrum = fft.make_output_vec();
    fft.process(&mut buf, &mut spectrum)
        .expect("forward buffer lengths match the plan");
    spectrum
}

/// Inverse transform scaled by 1/L, so that `inverse(forward(x), x.len())`
/// round-trips.
#[must_use]
pub fn inverse(mut spectrum: Spectrum, len: usize) -> Vec<f64> {
    if len == 1 {
        return vec![spectrum[0].re];
    }
    // The rotation helpers leave float noise on the bins that must stay
    // purely real; clear it or the inverse transform rejects the spectrum.
    spectrum[0].im = 0.0;
    if len % 2 == 0 {
        let nyquist = spectrum.len() - 1;
        spectrum[nyquist].im = 0.0;
    }
    let fft = RealFftPlanner::<f64>::new().plan_fft_inverse(len);
    let mut out = fft.make_output_vec();
    fft.process(&mut spectrum, &mut out)
        .expect("inverse buffer lengths match the plan");
    let scale = 1.0 / len as f64;
    for x in &mut out {
        *x *= scale;
    }
    out
}

pub fn multiply(x: &mut Spectrum, y: &Spectrum) {
    for (a, b) in x.iter_mut().zip(y) {
        *a *= b;
    }
}

/// The one spectral primitive behind ndm, self-convolution and roll-and-sum:
/// for every bin k, `acc[k] += factor * e^(-2*pi*i*k*offset/len) * s[k]^n`.
/// The rotation is a circular shift by `offset` in the time domain, applied
/// without a second transform.
pub fn pow_rotate_acc(
    acc: &mut [Complex64],
    spectrum: &[Complex64],
    n: u64,
    factor: f64,
    offset: Int,
    len: usize,
) {
    let step = -2.0 * std::f64::consts::PI * offset as f64 / len as f64;
    for (k, (a, s)) in acc.iter_mut().zip(spectrum).enumerate() {
        let rot = Complex64::from_polar(1.0, step * k as f64);
        *a += factor * rot * cpow(*s, n);
    }
}

// Exponentiation by squaring; keeps purely real inputs purely real, which
// Complex::powf does not guarantee.
fn cpow(mut base: Complex64, mut exp: u64) -> Complex64 {
    let mut out = Complex64::new(1.0, 0.0);
    while exp > 0 {
        if exp & 1 == 1 {
            out *= base;
        }
        base *= base;
        exp >>= 1;
    }
    out
}
