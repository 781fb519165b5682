mod vector3_f64;
pub use vector3_f64::*;

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T,
}

impl<T: num_traits::identities::Zero + Copy> Vector3<T> {
    #[inline]
    pub fn new(x: T, y: T, z: T) -> Self {
        Vector3 { x, y, z }
    }

    #[inline]
    pub fn zeros() -> Vector3<T> {
        Vector3 {
            x: T::zero(),
            y: T::zero(),
            z: T::zero(),
        }
    }

    pub fn from_slice(v: &[T]) -> Vector3<T> {
        Vector3 {
            x: v[0],
            y: v[1],
            z: v[2],
        }
    }

    pub fn to_array(&self) -> [T; 3] {
        [self.x, self.y, self.z]
    }

    pub fn to_vec(&self) -> Vec<T> {
        vec![self.x, self.y, self.z]
    }
}

/// Concatenate the components of a list of vectors: x0 y0 z0 x1 y1 z1 ...
pub fn flatten<T: num_traits::identities::Zero + Copy>(v: &[Vector3<T>]) -> Vec<T> {
    v.iter().flat_map(|p| p.to_array()).collect()
}
