#![allow(non_camel_case_types)]

mod error;
pub use error::*;

pub type c64 = num_complex::Complex<f64>;

/// Build complex values from an interleaved (re, im, re, im, ...) buffer.
pub fn interleaved_to_c64(v: &[f64]) -> Vec<c64> {
    v.chunks_exact(2).map(|p| c64 { re: p[0], im: p[1] }).collect()
}
