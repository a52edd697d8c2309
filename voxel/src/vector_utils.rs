use cgmath::Vector3;

macro_rules! impl_euclid_elem_wise {
    ($($ty:ty),+) => {
        $(
            impl RemEuclid<$ty> for Vector3<$ty> {
                fn rem_euclid(self, rhs: $ty) -> Self {
                    Vector3::new(self.x.rem_euclid(rhs), self.y.rem_euclid(rhs), self.z.rem_euclid(rhs))
                }
            }

            impl DivEuclid<$ty> for Vector3<$ty> {
                fn div_euclid(self, rhs: $ty) -> Self {
                    Vector3::new(self.x.div_euclid(rhs), self.y.div_euclid(rhs), self.z.div_euclid(rhs))
                }
            }
        )+
    };
}

pub trait RemEuclid<T> {
    fn rem_euclid(self, rhs: T) -> Self;
}

/// Element-wise division rounding towards negative infinity for negative components.
pub trait DivEuclid<T> {
    fn div_euclid(self, rhs: T) -> Self;
}

impl_euclid_elem_wise!(i8, i16, i32, i64);
