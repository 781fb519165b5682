use vector3::*;

use std::fmt;

// Lattice vectors a, b, c. The unit is whatever the caller reads them in;
// the crystal reader keeps Angstrom.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Lattice {
    a: Vector3f64,
    b: Vector3f64,
    c: Vector3f64,
}

impl Lattice {
    pub fn new(a: &[f64], b: &[f64], c: &[f64]) -> Lattice {
        Lattice {
            a: Vector3f64::from_slice(a),
            b: Vector3f64::from_slice(b),
            c: Vector3f64::from_slice(c),
        }
    }

    pub fn get_vector_a(&self) -> Vector3f64 {
        self.a
    }

    pub fn get_vector_b(&self) -> Vector3f64 {
        self.b
    }

    pub fn get_vector_c(&self) -> Vector3f64 {
        self.c
    }

    // ( a x b ) . c
    pub fn volume(&self) -> f64 {
        self.a.cross_product(&self.b).dot_product(&self.c)
    }

    pub fn scaled_by(&mut self, f: f64) {
        self.a = self.a * f;
        self.b = self.b * f;
        self.c = self.c * f;
    }

    // f_a = (b x c) . r / V, and cyclic
    pub fn cart_to_frac(&self, pos_c: &[f64], pos_f: &mut [f64]) {
        let r = Vector3f64::from_slice(pos_c);
        let vol = self.volume();

        pos_f[0] = self.b.cross_product(&self.c).dot_product(&r) / vol;
        pos_f[1] = self.c.cross_product(&self.a).dot_product(&r) / vol;
        pos_f[2] = self.a.cross_product(&self.b).dot_product(&r) / vol;
    }

    /// Cartesian distance between two fractional positions under periodic
    /// boundary conditions: the shortest of the 27 images of `pos_2` around
    /// `pos_1` once the difference is centered into [-0.5, 0.5).
    pub fn min_image_distance(&self, pos_1: &Vector3f64, pos_2: &Vector3f64) -> f64 {
        let half = Vector3f64::new(0.5, 0.5, 0.5);

        let d = (*pos_2 - *pos_1 + half).wrapped() - half;

        let mut rmin = f64::INFINITY;

        for i in -1..=1 {
            for j in -1..=1 {
                for k in -1..=1 {
                    let shift = Vector3f64::new(d.x + i as f64, d.y + j as f64, d.z + k as f64);

                    let r = (shift.x * self.a + shift.y * self.b + shift.z * self.c).norm2();

                    if r < rmin {
                        rmin = r;
                    }
                }
            }
        }

        rmin
    }
}

impl fmt::Display for Lattice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\n{:25.16}\t{:25.16}\t{:25.16}\n{:25.16}\t{:25.16}\t{:25.16}\n{:25.16}\t{:25.16}\t{:25.16}",
            "Lattice",
            self.a.x, self.a.y, self.a.z, self.b.x, self.b.y, self.b.z, self.c.x, self.c.y, self.c.z
        )
    }
}
