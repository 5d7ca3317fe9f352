use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

use crate::active::{binary, unary, Active};
use crate::float::Float;
use crate::graph::GraphThreadLocal;

impl<F: Float + GraphThreadLocal> Add for Active<F> {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        binary(
            self,
            rhs,
            self.value + rhs.value,
            F::one(),
            F::one(),
            F::zero(),
        )
    }
}

impl<F: Float + GraphThreadLocal> Sub for Active<F> {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        binary(
            self,
            rhs,
            self.value - rhs.value,
            F::one(),
            -F::one(),
            F::zero(),
        )
    }
}

impl<F: Float + GraphThreadLocal> Mul for Active<F> {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: Self) -> Self {
        // The mixed partial of x*y is 1; the pure second partials are zero,
        // including for x*x, where the e1-e2 coincidence doubling applies.
        binary(
            self,
            rhs,
            self.value * rhs.value,
            rhs.value,
            self.value,
            F::one(),
        )
    }
}

impl<F: Float + GraphThreadLocal> Div for Active<F> {
    type Output = Self;
    #[inline]
    fn div(self, rhs: Self) -> Self {
        // Recorded as x * (1/y): two vertices, keeping the binary vertex's
        // pure second partials zero.
        self * rhs.recip()
    }
}

impl<F: Float + GraphThreadLocal> Neg for Active<F> {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        unary(self, -self.value, -F::one(), F::zero())
    }
}

impl<F: Float + GraphThreadLocal> AddAssign for Active<F> {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl<F: Float + GraphThreadLocal> SubAssign for Active<F> {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl<F: Float + GraphThreadLocal> MulAssign for Active<F> {
    #[inline]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl<F: Float + GraphThreadLocal> DivAssign for Active<F> {
    #[inline]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

// Mixed ops: Active<F> with primitive floats. Plain numbers are not
// recorded; they fold into the edge weight of a unary vertex.
macro_rules! impl_active_scalar_ops {
    ($f:ty) => {
        impl Add<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn add(self, rhs: $f) -> Active<$f> {
                unary(self, self.value + rhs, 1.0, 0.0)
            }
        }

        impl Add<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn add(self, rhs: Active<$f>) -> Active<$f> {
                rhs + self
            }
        }

        impl Sub<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn sub(self, rhs: $f) -> Active<$f> {
                unary(self, self.value - rhs, 1.0, 0.0)
            }
        }

        impl Sub<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn sub(self, rhs: Active<$f>) -> Active<$f> {
                unary(rhs, self - rhs.value, -1.0, 0.0)
            }
        }

        impl Mul<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn mul(self, rhs: $f) -> Active<$f> {
                unary(self, self.value * rhs, rhs, 0.0)
            }
        }

        impl Mul<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn mul(self, rhs: Active<$f>) -> Active<$f> {
                rhs * self
            }
        }

        impl Div<$f> for Active<$f> {
            type Output = Active<$f>;
            #[inline]
            fn div(self, rhs: $f) -> Active<$f> {
                self * (1.0 / rhs)
            }
        }

        impl Div<Active<$f>> for $f {
            type Output = Active<$f>;
            #[inline]
            fn div(self, rhs: Active<$f>) -> Active<$f> {
                rhs.recip() * self
            }
        }

        impl AddAssign<$f> for Active<$f> {
            #[inline]
            fn add_assign(&mut self, rhs: $f) {
                *self = *self + rhs;
            }
        }

        impl SubAssign<$f> for Active<$f> {
            #[inline]
            fn sub_assign(&mut self, rhs: $f) {
                *self = *self - rhs;
            }
        }

        impl MulAssign<$f> for Active<$f> {
            #[inline]
            fn mul_assign(&mut self, rhs: $f) {
                *self = *self * rhs;
            }
        }

        impl DivAssign<$f> for Active<$f> {
            #[inline]
            fn div_assign(&mut self, rhs: $f) {
                *self = *self / rhs;
            }
        }
    };
}

impl_active_scalar_ops!(f32);
impl_active_scalar_ops!(f64);

// Comparisons read the primal values only; nothing is recorded.

impl<F: Float> PartialEq for Active<F> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<F: Float> PartialOrd for Active<F> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.value.partial_cmp(&other.value)
    }
}
